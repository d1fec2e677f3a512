use std::{collections::HashMap, env, fs, path::Path, path::PathBuf};
use crate::errors::ConfigError;

use super::app_config::{
    AppConfig, PartialAppConfig, CONFIG_FILE_NAME, ENV_LOG_LEVEL, ENV_SETTINGS_PATH,
    SETTINGS_FILE_NAME, USER_CONFIG_PATH,
};

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default paths
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a config loader reading from `base_path` instead of the user config directory
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self { base_path: Some(base_path) }
    }

    /// Load complete application configuration.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let config_dir = self.config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let partial_config = self.load_partial_config(&config_path)?;
        let env_map = self.collect_env_vars();

        let config = AppConfig::from_partial_and_env(
            partial_config,
            env_map,
            config_dir.join(SETTINGS_FILE_NAME),
        )?;
        tracing::debug!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Directory holding `config.toml` and, by default, `settings.toml`
    pub fn config_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(base_path) = &self.base_path {
            return Ok(base_path.clone());
        }
        match dirs::config_dir() {
            Some(dir) => Ok(dir.join("winject")),
            None => {
                let expanded = shellexpand::tilde(USER_CONFIG_PATH);
                if expanded.starts_with('~') {
                    Err(ConfigError::NoConfigDir)
                } else {
                    Ok(PathBuf::from(expanded.as_ref()))
                }
            }
        }
    }

    /// Load partial configuration from TOML file
    fn load_partial_config(&self, config_path: &Path) -> Result<Option<PartialAppConfig>, ConfigError> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(None);
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::FileRead(config_path.to_string_lossy().to_string(), e)
        })?;

        let partial_config: PartialAppConfig = toml::from_str(&content).map_err(|e| {
            ConfigError::TomlParse(config_path.to_string_lossy().to_string(), e)
        })?;

        Ok(Some(partial_config))
    }

    /// Collect relevant environment variables
    fn collect_env_vars(&self) -> HashMap<String, String> {
        let env_keys = [ENV_LOG_LEVEL, ENV_SETTINGS_PATH];

        let mut env_map = HashMap::new();
        for key in &env_keys {
            if let Ok(value) = env::var(key) {
                env_map.insert(key.to_string(), value);
            }
        }
        env_map
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
