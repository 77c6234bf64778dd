use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{SessionId, StoragePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioReferenceId(Uuid);

impl AudioReferenceId {
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

impl Default for AudioReferenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the bytes behind a reference actually live. Recorded per reference
/// so later reads choose the right retrieval path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    Local,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::S3 => "s3",
            StorageKind::Local => "local",
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s3" => Ok(StorageKind::S3),
            "local" => Ok(StorageKind::Local),
            _ => Err(format!("Invalid storage kind: {}", s)),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exactly one per call session. Immutable after intake except for
/// `duration_seconds`, filled in once transcription reports it.
#[derive(Debug, Clone)]
pub struct AudioReference {
    pub id: AudioReferenceId,
    pub session_id: SessionId,
    pub filename: String,
    pub storage_path: StoragePath,
    pub storage_kind: StorageKind,
    pub size_bytes: u64,
    pub mime_type: String,
    pub duration_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl AudioReference {
    pub fn new(
        session_id: SessionId,
        filename: String,
        storage_path: StoragePath,
        storage_kind: StorageKind,
        size_bytes: u64,
        mime_type: String,
    ) -> Self {
        Self {
            id: AudioReferenceId::new(),
            session_id,
            filename,
            storage_path,
            storage_kind,
            size_bytes,
            mime_type,
            duration_seconds: None,
            created_at: Utc::now(),
        }
    }
}
