//! Sample windows wired through the container

pub mod about;
pub mod customer;
pub mod interaction;
pub mod open_windows;

pub use about::AboutDialog;
pub use customer::CustomerWindow;
pub use interaction::ScriptedInteraction;
pub use open_windows::OpenWindowList;

use crate::domain::interfaces::settings::SettingsError;
use thiserror::Error;

/// Window construction failure
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Window width must be positive, got {0}")]
    InvalidWidth(i64),
    #[error("Failed to read window settings: {0}")]
    Settings(#[from] SettingsError),
}
