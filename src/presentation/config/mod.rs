mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    CoachingSettings, CoachingStrategySetting, DatabaseSettings, LlmSettings, LoggingSettings,
    ServerSettings, Settings, StorageProviderSetting, StorageSettings, TranscriptionSettings,
    TtsSettings,
};
