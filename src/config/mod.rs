pub mod app_config;
pub mod loader;

pub use app_config::{AppConfig, LoggingSection, SettingsBackend, SettingsSection, UiSection};
pub use loader::ConfigLoader;

pub use app_config::{CONFIG_FILE_NAME, SETTINGS_FILE_NAME, USER_CONFIG_PATH};
