use crate::infrastructure::factory::FactoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Window error: {0}")]
    Factory(#[from] FactoryError),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value '{value}' for configuration field '{field}'")]
    InvalidValue { field: String, value: String },
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

impl ConfigError {
    pub fn invalid(field: &str, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
        }
    }
}
