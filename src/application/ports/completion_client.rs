use async_trait::async_trait;

/// LLM completion capability. Implementations must request constrained JSON
/// output from the provider; callers parse the returned string strictly.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
