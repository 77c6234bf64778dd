use std::sync::Arc;

use crate::application::ports::{
    AudioRepository, CoachingRepository, ScoreRepository, SessionRepository, TranscriptRepository,
    VerdictRepository,
};
use crate::application::services::{AudioIntakeService, CoachingSynthesizer, PipelineService};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub audio: Arc<dyn AudioRepository>,
    pub transcripts: Arc<dyn TranscriptRepository>,
    pub verdicts: Arc<dyn VerdictRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub coaching: Arc<dyn CoachingRepository>,
    pub intake: Arc<AudioIntakeService>,
    pub pipeline: Arc<PipelineService>,
    pub synthesizer: Arc<CoachingSynthesizer>,
}
