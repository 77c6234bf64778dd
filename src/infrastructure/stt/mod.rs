mod mock_engine;
mod whisper_engine;

pub use mock_engine::MockSpeechToText;
pub use whisper_engine::OpenAiWhisperEngine;
