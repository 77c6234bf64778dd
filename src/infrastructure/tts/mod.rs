mod elevenlabs;
mod mock_synthesizer;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use mock_synthesizer::MockSynthesizer;
