use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Ollama client for interacting with the Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for every chat request
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Timeout applied to each chat request
    request_timeout: Duration,
    /// Sampling temperature sent with each chat request
    temperature: Option<f32>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// A message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// JSON schema (or "json") the response must follow
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Set the structured output format
    pub fn format(mut self, format: Value) -> Self {
        self.format = Some(format);
        self
    }
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Installed models as listed by `/api/tags`
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One installed model
#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Request body for `/api/pull`
#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

/// Final status of a non-streaming pull
#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl Ollama {
    /// Create a new Ollama client for `model` at `base_url`
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, request_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            model: model.into(),
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                // Force HTTP/1.1 - Ollama uses HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            request_timeout,
            temperature: None,
        }
    }

    /// Use a fixed sampling temperature for chat requests
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat request to the Ollama API
    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::transport_error("chat", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        Self::parse_chat_body(&response_text)
    }

    /// Parse a chat body, tolerating streamed JSONL output
    pub fn parse_chat_body(body: &str) -> Result<ChatResponse, ProviderError> {
        match serde_json::from_str::<ChatResponse>(body) {
            Ok(chat_response) => Ok(chat_response),
            Err(e) => {
                debug!(
                    "Chat response is not a single JSON object ({}), trying JSONL. First 500 chars: {}",
                    e,
                    body.chars().take(500).collect::<String>()
                );

                let chunks: Vec<Value> = body
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .filter_map(|line| serde_json::from_str::<Value>(line).ok())
                    .collect();

                if chunks.is_empty() {
                    return Err(ProviderError::ParseError(format!(
                        "Failed to parse Ollama API chat response: {}. Response contains invalid JSON.",
                        e
                    )));
                }

                // Streamed chunks each carry a piece of the message
                let content: String = chunks
                    .iter()
                    .filter_map(|chunk| chunk.get("message")?.get("content")?.as_str())
                    .collect();
                let last_field = |key: &str| chunks.last().and_then(|chunk| chunk.get(key));

                Ok(ChatResponse {
                    model: last_field("model").and_then(Value::as_str).unwrap_or("unknown").to_string(),
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content,
                    },
                    done: last_field("done").and_then(Value::as_bool).unwrap_or(true),
                    prompt_eval_count: last_field("prompt_eval_count").and_then(Value::as_u64),
                    eval_count: last_field("eval_count").and_then(Value::as_u64),
                })
            }
        }
    }

    /// List locally installed models
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error("tags", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama tags response: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether `installed` names the same model as `wanted`
    ///
    /// Ollama reports untagged models with an implicit `:latest` suffix.
    pub fn model_matches(installed: &str, wanted: &str) -> bool {
        let normalize = |name: &str| {
            if name.contains(':') {
                name.to_string()
            } else {
                format!("{}:latest", name)
            }
        };
        normalize(installed) == normalize(wanted)
    }

    /// Pull the configured model, blocking until the download finishes
    pub async fn pull_model(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                model: &self.model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Self::transport_error("pull", e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::ModelUnavailable {
                model: self.model.clone(),
                reason: format!("pull failed ({}): {}", status, body),
            });
        }

        // Some servers stream progress even when asked not to; the last line wins
        let last_line = body.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or_default();
        match serde_json::from_str::<PullResponse>(last_line) {
            Ok(PullResponse { error: Some(err), .. }) => Err(ProviderError::ModelUnavailable {
                model: self.model.clone(),
                reason: err,
            }),
            Ok(PullResponse { status, .. }) => {
                debug!("Pull of {} finished with status '{}'", self.model, status);
                Ok(())
            }
            Err(e) => Err(ProviderError::ParseError(format!("Failed to parse Ollama pull response: {}", e))),
        }
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error("version", e))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }

    fn transport_error(what: &str, e: reqwest::Error) -> ProviderError {
        if e.is_connect() || e.is_timeout() {
            ProviderError::ConnectionError(format!("Ollama {} request failed: {}", what, e))
        } else {
            ProviderError::RequestFailed(format!("Failed to send {} request to Ollama API: {}", what, e))
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn chat(&self, prompt: &str, format: Option<&Value>) -> Result<String, ProviderError> {
        let mut request = ChatRequest::new(&self.model, vec![ChatMessage::user(prompt)]);
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        if let Some(format) = format {
            request = request.format(format.clone());
        }

        let response = self.send_chat(&request).await?;
        Ok(response.message.content)
    }

    async fn ensure_model_available(&self) -> Result<(), ProviderError> {
        if let Ok(version) = self.version().await {
            debug!("Connected to Ollama {} at {}", version, self.base_url);
        }

        let installed = self.list_models().await.map_err(|e| ProviderError::ModelUnavailable {
            model: self.model.clone(),
            reason: e.to_string(),
        })?;

        if installed.iter().any(|name| Self::model_matches(name, &self.model)) {
            return Ok(());
        }

        info!("Model {} not found locally, pulling it", self.model);
        self.pull_model().await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
