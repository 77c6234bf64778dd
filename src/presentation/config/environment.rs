use std::fmt;

/// Runtime environment the coaching service was launched in. Selects the
/// layered `appsettings.*` file and is echoed into every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "Local",
            Environment::Test => "Test",
            Environment::Prod => "Prod",
        }
    }

    /// Stem of the settings file for this environment, without extension
    /// (the `config` crate resolves the format itself).
    pub fn config_file_stem(&self) -> String {
        format!("appsettings.{}", self.as_str().to_lowercase())
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(format!(
                "Invalid environment: {}. Expected: local, test, or prod",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively_with_a_production_alias() {
        assert_eq!(Environment::try_from("LOCAL".to_string()), Ok(Environment::Local));
        assert_eq!(Environment::try_from("production".to_string()), Ok(Environment::Prod));
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn settings_file_stem_is_lowercased() {
        assert_eq!(Environment::Test.config_file_stem(), "appsettings.test");
    }
}
