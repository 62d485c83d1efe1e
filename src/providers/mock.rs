/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a structured translation
 * - `MockProvider::intermittent()` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::scripted()` - Replays a fixed list of outcomes
 */

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `{"translation": ...}` built by the responder
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw message content
    Content(String),
    /// Fail the request
    Error,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, in order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Replies consumed before `behavior` applies
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Builds the translation text from the prompt
    responder: fn(&str) -> String,
    /// Whether `ensure_model_available` fails
    model_missing: bool,
    /// Delay before `ensure_model_available` answers
    model_check_delay_ms: u64,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            responder: Self::default_responder,
            model_missing: false,
            model_check_delay_ms: 0,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a working mock that first replays `replies`
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let provider = Self::working();
        provider
            .script
            .lock()
            .expect("mock script lock")
            .extend(replies);
        provider
    }

    /// Set the function that turns a prompt into a translation
    pub fn with_responder(mut self, responder: fn(&str) -> String) -> Self {
        self.responder = responder;
        self
    }

    /// Make the model availability check fail
    pub fn with_missing_model(mut self) -> Self {
        self.model_missing = true;
        self
    }

    /// Make the model availability check wait before answering
    pub fn with_model_check_delay(mut self, delay_ms: u64) -> Self {
        self.model_check_delay_ms = delay_ms;
        self
    }

    /// Number of chat requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock prompts lock").clone()
    }

    /// Wrap a translation the way a structured-output model would
    pub fn structured(translation: &str) -> String {
        serde_json::json!({ "translation": translation }).to_string()
    }

    fn default_responder(prompt: &str) -> String {
        let line = prompt
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default();
        let text = line
            .trim_start_matches("Line to translate:")
            .trim_start_matches("1.")
            .trim_start_matches("- ")
            .trim();
        format!("[TRANSLATED] {}", text)
    }

    fn simulated_failure(count: usize) -> ProviderError {
        ProviderError::ApiError {
            message: format!("Simulated provider failure (request #{})", count + 1),
            status_code: 503,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn chat(&self, prompt: &str, _format: Option<&Value>) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().expect("mock prompts lock").push(prompt.to_string());

        let scripted = self.script.lock().expect("mock script lock").pop_front();
        if let Some(reply) = scripted {
            return match reply {
                MockReply::Content(content) => Ok(content),
                MockReply::Error => Err(Self::simulated_failure(count)),
            };
        }

        match self.behavior {
            MockBehavior::Working => Ok(Self::structured(&(self.responder)(prompt))),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(Self::simulated_failure(count))
                } else {
                    Ok(Self::structured(&(self.responder)(prompt)))
                }
            }

            MockBehavior::Failing => Err(Self::simulated_failure(count)),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::structured(&(self.responder)(prompt)))
            }
        }
    }

    async fn ensure_model_available(&self) -> Result<(), ProviderError> {
        if self.model_check_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.model_check_delay_ms)).await;
        }
        if self.model_missing {
            Err(ProviderError::ModelUnavailable {
                model: self.model().to_string(),
                reason: "simulated missing model".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
