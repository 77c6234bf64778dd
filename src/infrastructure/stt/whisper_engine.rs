use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{
    AudioSource, SpeechToText, SpeechToTextError, TranscriptionOutcome,
};

pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_seconds: u64,
}

impl OpenAiWhisperEngine {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_seconds: u64) -> Self {
        let endpoint = format!(
            "{}/v1/audio/transcriptions",
            base_url.trim_end_matches('/')
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_seconds,
        }
    }

    async fn load_source(source: AudioSource) -> Result<(Vec<u8>, String), SpeechToTextError> {
        match source {
            AudioSource::Buffer { data, filename } => Ok((data, filename)),
            AudioSource::Path(path) => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "audio".to_string());
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    SpeechToTextError::SourceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                Ok((data, filename))
            }
        }
    }
}

/// verbose_json response shape; `language` and `duration` are absent in the
/// plain json format.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
    language: Option<String>,
    duration: Option<f64>,
}

#[async_trait]
impl SpeechToText for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        source: AudioSource,
        language_hint: &str,
    ) -> Result<TranscriptionOutcome, SpeechToTextError> {
        let (data, filename) = Self::load_source(source).await?;

        let file_part = multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str("application/octet-stream")
            .map_err(|e| SpeechToTextError::UnsupportedFormat(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");
        if !language_hint.is_empty() {
            form = form.text("language", language_hint.to_string());
        }

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending audio to Whisper");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechToTextError::Timeout(self.timeout_seconds)
                } else {
                    SpeechToTextError::ApiRequestFailed(format!("request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpeechToTextError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let result: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechToTextError::InvalidResponse(e.to_string()))?;

        let text = result.text.trim().to_string();
        if text.is_empty() {
            return Err(SpeechToTextError::InvalidResponse(
                "empty transcript".to_string(),
            ));
        }

        tracing::info!(
            chars = text.len(),
            duration = ?result.duration,
            "Whisper transcription completed"
        );

        Ok(TranscriptionOutcome {
            text,
            language: result
                .language
                .unwrap_or_else(|| language_hint.to_string()),
            duration_seconds: result.duration,
        })
    }
}
