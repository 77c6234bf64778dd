mod audio_reference;
mod call_session;
mod coaching;
mod criterion;
mod score;
mod session_id;
mod session_status;
mod storage_path;
mod transcript;
mod verdict;

pub use audio_reference::{AudioReference, AudioReferenceId, StorageKind};
pub use call_session::CallSession;
pub use coaching::{
    CoachingContent, CoachingFeedback, CoachingPoint, FeedbackId, NarrationReference,
};
pub use criterion::{criterion_at, criterion_catalog, Criterion, SubQuestion, CRITERION_COUNT};
pub use score::{RiskBand, ScoreHistoryEntry, ScoreSnapshot, ScoreTrigger};
pub use session_id::SessionId;
pub use session_status::SessionStatus;
pub use storage_path::StoragePath;
pub use transcript::{Transcript, TranscriptId};
pub use verdict::{
    CriterionVerdict, NewSubQuestionEvaluation, NewVerdict, SubQuestionEvaluation, VerdictId,
};
