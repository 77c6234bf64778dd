use std::path::PathBuf;

use async_trait::async_trait;

/// Audio handed to the transcription capability: a file on disk for locally
/// stored recordings, or a named in-memory buffer streamed out of object
/// storage (no temp-file coupling).
#[derive(Debug, Clone)]
pub enum AudioSource {
    Path(PathBuf),
    Buffer { data: Vec<u8>, filename: String },
}

#[derive(Debug, Clone)]
pub struct TranscriptionOutcome {
    pub text: String,
    pub language: String,
    pub duration_seconds: Option<f64>,
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        source: AudioSource,
        language_hint: &str,
    ) -> Result<TranscriptionOutcome, SpeechToTextError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechToTextError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("audio not readable: {0}")]
    SourceUnavailable(String),
}
