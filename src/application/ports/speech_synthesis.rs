use async_trait::async_trait;

/// Text-to-speech capability for narrated coaching feedback. Best-effort:
/// every caller treats failure as non-fatal.
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, NarrationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("narration unavailable: {0}")]
    Unavailable(String),
}
