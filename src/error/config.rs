//! Configuration loading errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid value {value:?} for {variable}: {message}")]
    InvalidEnv {
        variable: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    pub fn invalid_env(
        variable: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidEnv {
            variable: variable.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidEnv { .. } => "CONFIG_INVALID_ENV",
        }
    }
}
