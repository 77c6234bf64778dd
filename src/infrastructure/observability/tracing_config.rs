/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    /// Base level applied when `RUST_LOG` is unset; comes from the
    /// `logging.level` setting.
    pub default_level: String,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| "local".to_string()),
            default_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        }
    }
}
