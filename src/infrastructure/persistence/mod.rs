mod memory;
mod pg_audio_repository;
mod pg_coaching_repository;
mod pg_pool;
mod pg_score_repository;
mod pg_session_repository;
mod pg_transcript_repository;
mod pg_verdict_repository;

pub use memory::{
    InMemoryAudioRepository, InMemoryCoachingRepository, InMemoryScoreRepository,
    InMemorySessionRepository, InMemoryTranscriptRepository, InMemoryVerdictRepository,
};
pub use pg_audio_repository::PgAudioRepository;
pub use pg_coaching_repository::PgCoachingRepository;
pub use pg_pool::create_pool;
pub use pg_score_repository::PgScoreRepository;
pub use pg_session_repository::PgSessionRepository;
pub use pg_transcript_repository::PgTranscriptRepository;
pub use pg_verdict_repository::PgVerdictRepository;
