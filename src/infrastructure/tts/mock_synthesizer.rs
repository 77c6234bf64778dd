use async_trait::async_trait;

use crate::application::ports::{NarrationError, SpeechSynthesis};

/// Fixed-size fake audio for tests; `failing` exercises the non-fatal path.
pub struct MockSynthesizer {
    audio_bytes: usize,
    failing: bool,
}

impl MockSynthesizer {
    pub fn new(audio_bytes: usize) -> Self {
        Self {
            audio_bytes,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            audio_bytes: 0,
            failing: true,
        }
    }
}

#[async_trait]
impl SpeechSynthesis for MockSynthesizer {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, NarrationError> {
        if self.failing {
            return Err(NarrationError::Unavailable("synthesizer down".to_string()));
        }
        Ok(vec![0u8; self.audio_bytes])
    }
}
