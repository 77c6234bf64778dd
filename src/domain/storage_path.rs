use std::fmt;

use super::SessionId;

/// Key of a stored object, relative to the store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn for_audio(session_id: &SessionId, filename: &str) -> Self {
        Self(format!("audio/{}/{}", session_id.as_uuid(), filename))
    }

    pub fn for_narration(session_id: &SessionId) -> Self {
        Self(format!("coaching/{}/feedback.mp3", session_id.as_uuid()))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
