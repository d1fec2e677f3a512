use crate::domain::interfaces::ui::UserChoice;
use crate::errors::ConfigError;
use crate::logging::{LogFormat, LoggingConfig, LoggingEnvironment};
use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf, str::FromStr};
use tracing::Level;

use super::loader::ConfigLoader;

// Configuration location constants
pub const USER_CONFIG_PATH: &str = "~/.config/winject";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

// Environment overrides
pub const ENV_LOG_LEVEL: &str = "WINJECT_LOG_LEVEL";
pub const ENV_SETTINGS_PATH: &str = "WINJECT_SETTINGS_PATH";

/// Main Application Configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub logging: LoggingSection,
    pub settings: SettingsSection,
    pub ui: UiSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSection {
    /// Preset the level and format start from; `None` keeps the plain defaults
    pub environment: Option<LoggingEnvironment>,
    pub level: Level,
    pub format: LogFormat,
}

/// Where window settings are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSection {
    pub backend: SettingsBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSection {
    /// Answer the headless interaction driver gives modal windows
    pub default_choice: UserChoice,
}

/// Partial Application Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialAppConfig {
    logging: Option<PartialLoggingSection>,
    settings: Option<PartialSettingsSection>,
    ui: Option<PartialUiSection>,
}

#[derive(Deserialize, Debug, Default)]
struct PartialLoggingSection {
    environment: Option<String>,
    level: Option<String>,
    format: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct PartialSettingsSection {
    backend: Option<SettingsBackend>,
    path: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct PartialUiSection {
    default_choice: Option<UserChoice>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config()
    }

    /// Load configuration with a custom config directory (for testing)
    pub fn load_with_base_path(base_path: PathBuf) -> Result<Self, ConfigError> {
        ConfigLoader::with_base_path(base_path).load_config()
    }

    /// Create AppConfig from partial config and environment.
    ///
    /// Environment values win over the file; `default_settings_path` is used
    /// when neither names a settings file.
    pub fn from_partial_and_env(
        partial: Option<PartialAppConfig>,
        env_map: HashMap<String, String>,
        default_settings_path: PathBuf,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let logging = partial.logging.unwrap_or_default();
        let settings = partial.settings.unwrap_or_default();
        let ui = partial.ui.unwrap_or_default();

        let environment = match logging.environment {
            Some(environment) => Some(
                environment
                    .parse::<LoggingEnvironment>()
                    .map_err(|_| ConfigError::invalid("logging.environment", environment.as_str()))?,
            ),
            None => None,
        };
        let preset = environment.map_or_else(LoggingConfig::default, LoggingConfig::for_environment);

        let level = match env_map.get(ENV_LOG_LEVEL).or(logging.level.as_ref()) {
            Some(level) => Level::from_str(level).map_err(|_| ConfigError::invalid("logging.level", level.as_str()))?,
            None => preset.level,
        };
        let format = match logging.format {
            Some(format) => format
                .parse::<LogFormat>()
                .map_err(|_| ConfigError::invalid("logging.format", format.as_str()))?,
            None => preset.format,
        };

        let path = env_map
            .get(ENV_SETTINGS_PATH)
            .or(settings.path.as_ref())
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .unwrap_or(default_settings_path);

        Ok(Self {
            logging: LoggingSection {
                environment,
                level,
                format,
            },
            settings: SettingsSection {
                backend: settings.backend.unwrap_or(SettingsBackend::File),
                path,
            },
            ui: UiSection {
                default_choice: ui.default_choice.unwrap_or(UserChoice::Confirmed),
            },
        })
    }

    /// Logging setup derived from the `[logging]` section
    pub fn logging_config(&self) -> LoggingConfig {
        self.logging
            .environment
            .map_or_else(LoggingConfig::default, LoggingConfig::for_environment)
            .with_level(self.logging.level)
            .with_format(self.logging.format)
    }
}

impl Default for AppConfig {
    /// In-memory settings, info logging, modal windows confirmed
    fn default() -> Self {
        Self {
            logging: LoggingSection {
                environment: None,
                level: Level::INFO,
                format: LogFormat::Pretty,
            },
            settings: SettingsSection {
                backend: SettingsBackend::Memory,
                path: PathBuf::from(SETTINGS_FILE_NAME),
            },
            ui: UiSection {
                default_choice: UserChoice::Confirmed,
            },
        }
    }
}
