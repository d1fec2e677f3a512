//! UI 对象接口
//!
//! Windows are headless: displaying one records the fact with its collaborators,
//! and modal results come from an [`InteractionDriver`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How the user dismissed a modal window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserChoice {
    Confirmed,
    Cancelled,
}

impl fmt::Display for UserChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserChoice::Confirmed => f.write_str("confirmed"),
            UserChoice::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Window-like object the factory can create and display
pub trait UiObject: Send + Sync {
    /// Identity of this particular instance
    fn id(&self) -> Uuid;

    fn name(&self) -> &str;

    /// Display and block until dismissed
    fn show_modal(&self) -> UserChoice;

    /// Display and return immediately; the window stays open
    fn show_non_modal(&self);

    fn close(&self);

    fn is_visible(&self) -> bool;

    /// Release resources owned by this window alone. Closes it by default.
    fn dispose(&self) {
        self.close();
    }
}

/// Source of user decisions for modal windows
pub trait InteractionDriver: Send + Sync {
    fn await_choice(&self, window: &str) -> UserChoice;
}
