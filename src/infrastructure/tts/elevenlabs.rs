use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::application::ports::{NarrationError, SpeechSynthesis};

const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsSynthesizer {
    client: Client,
    base_url: String,
    api_key: String,
    model_id: String,
    timeout_seconds: u64,
}

impl ElevenLabsSynthesizer {
    pub fn new(base_url: &str, api_key: &str, model_id: &str, timeout_seconds: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model_id: model_id.to_string(),
            timeout_seconds,
        }
    }
}

#[async_trait]
impl SpeechSynthesis for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, NarrationError> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, voice, OUTPUT_FORMAT
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .json(&json!({
                "text": text,
                "model_id": self.model_id,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrationError::Timeout(self.timeout_seconds)
                } else {
                    NarrationError::ApiRequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NarrationError::ApiRequestFailed(e.to_string()))?;

        if bytes.is_empty() {
            return Err(NarrationError::Unavailable("empty audio body".to_string()));
        }

        tracing::info!(bytes = bytes.len(), "Narration audio synthesized");
        Ok(bytes.to_vec())
    }
}
