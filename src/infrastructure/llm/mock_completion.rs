use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{CompletionClient, CompletionError};

/// Canned completion responses for tests; calls pop the queue in order.
#[derive(Default)]
pub struct MockCompletionClient {
    responses: Mutex<Vec<Result<String, String>>>,
    calls: AtomicUsize,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(body: &str) -> Self {
        let mock = Self::new();
        mock.queue_response(body);
        mock
    }

    pub fn queue_response(&self, body: &str) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push(Ok(body.to_string()));
        }
    }

    pub fn queue_failure(&self, message: &str) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push(Err(message.to_string()));
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete_json(&self, _system: &str, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| {
                if responses.is_empty() {
                    None
                } else {
                    Some(responses.remove(0))
                }
            })
            .ok_or_else(|| CompletionError::ApiRequestFailed("no queued response".to_string()))?;

        next.map_err(CompletionError::ApiRequestFailed)
    }
}
