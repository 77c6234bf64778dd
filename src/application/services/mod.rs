pub mod audio_intake;
pub mod checklist_analyzer;
pub mod coaching_strategy;
pub mod coaching_synthesizer;
pub mod media_stores;
pub mod pipeline;
pub mod scoring_engine;
pub mod transcription;

pub use audio_intake::{AudioIntakeService, IntakeError, IntakeOutcome};
pub use checklist_analyzer::{AnalysisError, ChecklistAnalyzer};
pub use coaching_strategy::{
    CoachingStrategy, CoachingStrategyError, Gap, GapReport, LlmCoach, TemplateCoach,
};
pub use coaching_synthesizer::{CoachingError, CoachingSynthesizer};
pub use media_stores::MediaStores;
pub use pipeline::{PipelineError, PipelineMessage, PipelineService, PipelineWorker};
pub use scoring_engine::{compute_snapshot, ScoringEngine, ScoringError};
pub use transcription::{TranscriptionRunError, TranscriptionService};
