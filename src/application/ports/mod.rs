mod audio_repository;
mod coaching_repository;
mod completion_client;
mod media_store;
mod repository_error;
mod score_repository;
mod session_repository;
mod speech_synthesis;
mod speech_to_text;
mod transcript_repository;
mod verdict_repository;

pub use audio_repository::AudioRepository;
pub use coaching_repository::CoachingRepository;
pub use completion_client::{CompletionClient, CompletionError};
pub use media_store::{MediaStore, MediaStoreError};
pub use repository_error::RepositoryError;
pub use score_repository::ScoreRepository;
pub use session_repository::SessionRepository;
pub use speech_synthesis::{NarrationError, SpeechSynthesis};
pub use speech_to_text::{AudioSource, SpeechToText, SpeechToTextError, TranscriptionOutcome};
pub use transcript_repository::TranscriptRepository;
pub use verdict_repository::VerdictRepository;
