/*!
 * Ollama client tests that need no running server
 */

use std::time::Duration;

use subtran::errors::ProviderError;
use subtran::providers::Provider;
use subtran::providers::ollama::Ollama;

// Port 9 (discard) is closed on test machines, so connections are refused
const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_ensureModelAvailable_withUnreachableServer_shouldReturnModelUnavailable() {
    let client = Ollama::new(UNREACHABLE_ENDPOINT, "phi4", Duration::from_secs(2));

    let result = client.ensure_model_available().await;

    assert!(matches!(result, Err(ProviderError::ModelUnavailable { ref model, .. }) if model == "phi4"));
}

#[tokio::test]
async fn test_chat_withUnreachableServer_shouldReturnTransportError() {
    let client = Ollama::new(UNREACHABLE_ENDPOINT, "phi4", Duration::from_secs(2));

    let result = client.chat("Line to translate: Hello", None).await;

    assert!(matches!(
        result,
        Err(ProviderError::ConnectionError(_)) | Err(ProviderError::RequestFailed(_))
    ));
}
