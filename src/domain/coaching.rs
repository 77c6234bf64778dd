use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SessionId, StorageKind, StoragePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
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

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

/// One titled coaching observation with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingPoint {
    pub point: String,
    pub explanation: String,
}

/// The strategy output contract: every coaching strategy, templated or
/// LLM-generated, produces exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachingContent {
    pub feedback_text: String,
    pub strengths: Vec<CoachingPoint>,
    pub improvement_areas: Vec<CoachingPoint>,
    pub action_items: Vec<String>,
}

impl CoachingContent {
    /// Fixed message for a gap-free checklist. No external call is made to
    /// produce this.
    pub fn perfect_score() -> Self {
        Self {
            feedback_text: "Outstanding call. You validated all ten checklist items: the \
                trigger event, its priority, the buying target, the people who influence \
                the decision and what it means to them, your mentor, the decision process, \
                fit, alternatives, and where you rank. Keep running calls exactly like \
                this one."
                .to_string(),
            strengths: Vec::new(),
            improvement_areas: Vec::new(),
            action_items: Vec::new(),
        }
    }
}

/// Narrated-audio artifact attached to a feedback row.
#[derive(Debug, Clone)]
pub struct NarrationReference {
    pub storage_path: StoragePath,
    pub storage_kind: StorageKind,
    pub duration_seconds: u32,
}

/// At most one per session. Regeneration deletes and recreates the row.
#[derive(Debug, Clone)]
pub struct CoachingFeedback {
    pub id: FeedbackId,
    pub session_id: SessionId,
    pub feedback_text: String,
    pub strengths: Vec<CoachingPoint>,
    pub improvement_areas: Vec<CoachingPoint>,
    pub action_items: Vec<String>,
    pub audio: Option<NarrationReference>,
    pub generated_at: DateTime<Utc>,
}

impl CoachingFeedback {
    pub fn new(
        session_id: SessionId,
        content: CoachingContent,
        audio: Option<NarrationReference>,
    ) -> Self {
        Self {
            id: FeedbackId::new(),
            session_id,
            feedback_text: content.feedback_text,
            strengths: content.strengths,
            improvement_areas: content.improvement_areas,
            action_items: content.action_items,
            audio,
            generated_at: Utc::now(),
        }
    }
}
