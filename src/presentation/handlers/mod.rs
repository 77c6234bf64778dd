mod audio;
mod coaching;
mod health;
mod scoring;
mod sessions;
mod transcription;
mod verdicts;

pub use audio::{get_audio_handler, upload_audio_handler};
pub use coaching::{get_coaching_handler, regenerate_coaching_handler};
pub use health::health_handler;
pub use scoring::{calculate_score_handler, get_score_handler, score_history_handler};
pub use sessions::{
    create_session_handler, get_session_handler, list_sessions_handler, submit_session_handler,
};
pub use transcription::{get_transcript_handler, request_transcription_handler};
pub use verdicts::{list_verdicts_handler, override_verdict_handler};
