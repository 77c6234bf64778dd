use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{
    AudioSource, SpeechToText, SpeechToTextError, TranscriptionOutcome,
};

/// Canned transcription results for tests. Each call pops the next queued
/// outcome; an empty queue fails the call.
#[derive(Default)]
pub struct MockSpeechToText {
    outcomes: Mutex<Vec<Result<TranscriptionOutcome, String>>>,
    calls: AtomicUsize,
}

impl MockSpeechToText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(text: &str, language: &str, duration_seconds: Option<f64>) -> Self {
        let mock = Self::new();
        mock.queue_success(text, language, duration_seconds);
        mock
    }

    pub fn queue_success(&self, text: &str, language: &str, duration_seconds: Option<f64>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(Ok(TranscriptionOutcome {
                text: text.to_string(),
                language: language.to_string(),
                duration_seconds,
            }));
        }
    }

    pub fn queue_failure(&self, message: &str) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(Err(message.to_string()));
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(
        &self,
        _source: AudioSource,
        _language_hint: &str,
    ) -> Result<TranscriptionOutcome, SpeechToTextError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| {
                if outcomes.is_empty() {
                    None
                } else {
                    Some(outcomes.remove(0))
                }
            })
            .ok_or_else(|| {
                SpeechToTextError::ApiRequestFailed("no queued transcription".to_string())
            })?;

        next.map_err(SpeechToTextError::ApiRequestFailed)
    }
}
