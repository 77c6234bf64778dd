use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscriptId(Uuid);

impl TranscriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TranscriptId {
    fn default() -> Self {
        Self::new()
    }
}

/// Speech-to-text output for a session. Never overwritten in place: a
/// re-transcription deletes the prior row (and its dependent verdicts) first.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: TranscriptId,
    pub session_id: SessionId,
    pub text: String,
    pub language: String,
    pub duration_seconds: Option<f64>,
    pub word_count: u32,
    pub transcribed_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(
        session_id: SessionId,
        text: String,
        language: String,
        duration_seconds: Option<f64>,
    ) -> Self {
        let word_count = text.split_whitespace().count() as u32;
        Self {
            id: TranscriptId::new(),
            session_id,
            text,
            language,
            duration_seconds,
            word_count,
            transcribed_at: Utc::now(),
        }
    }
}
