//! 领域层接口定义
//!
//! Abstractions for every external collaborator a window may depend on.

pub mod logging;
pub mod settings;
pub mod ui;

pub use logging::{EventLevel, EventLogger};
pub use settings::{SettingValue, SettingsError, SettingsExt, SettingsStore};
pub use ui::{InteractionDriver, UiObject, UserChoice};
