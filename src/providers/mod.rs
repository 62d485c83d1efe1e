/*!
 * Model backends for subtitle translation.
 *
 * This module contains the client side of the language model:
 * - Ollama: Local LLM server reached over HTTP
 * - Mock: Scripted provider for tests and dry runs
 */

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all model backends
///
/// The orchestrator drives a provider one request at a time; implementations
/// do not need to be safe for concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Send a single chat prompt and return the assistant's message content
    ///
    /// # Arguments
    /// * `prompt` - The user prompt
    /// * `format` - Optional JSON schema the response content must follow
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw message content or an error
    async fn chat(&self, prompt: &str, format: Option<&Value>) -> Result<String, ProviderError>;

    /// Make sure the configured model can serve requests, pulling it if needed
    async fn ensure_model_available(&self) -> Result<(), ProviderError>;

    /// The model identifier this provider talks to
    fn model(&self) -> &str;
}

pub mod mock;
pub mod ollama;
