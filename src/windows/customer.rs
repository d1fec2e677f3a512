//! Customer editor window
//!
//! Reads its width from the settings collaborator when built and writes it
//! back on disposal. Opening and closing are reported to the event logger.

use super::WindowError;
use crate::domain::interfaces::logging::EventLogger;
use crate::domain::interfaces::settings::{SettingsExt, SettingsStore};
use crate::domain::interfaces::ui::{InteractionDriver, UiObject, UserChoice};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub const WIDTH_SETTING: &str = "customer-window.width";
pub const DEFAULT_WIDTH: i64 = 800;

pub struct CustomerWindow {
    id: Uuid,
    width: AtomicU32,
    logger: Arc<dyn EventLogger>,
    settings: Arc<dyn SettingsStore>,
    interaction: Arc<dyn InteractionDriver>,
    visible: AtomicBool,
    disposed: AtomicBool,
}

impl CustomerWindow {
    pub const NAME: &'static str = "customer-window";

    pub fn new(
        logger: Arc<dyn EventLogger>,
        settings: Arc<dyn SettingsStore>,
        interaction: Arc<dyn InteractionDriver>,
    ) -> Result<Self, WindowError> {
        let width: i64 = settings.read_or(WIDTH_SETTING, DEFAULT_WIDTH)?;
        let width = u32::try_from(width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or(WindowError::InvalidWidth(width))?;

        logger.info(&format!("Customer window created ({}px wide)", width));
        Ok(Self {
            id: Uuid::new_v4(),
            width: AtomicU32::new(width),
            logger,
            settings,
            interaction,
            visible: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn width(&self) -> u32 {
        self.width.load(Ordering::SeqCst)
    }

    /// New width, persisted when the window is disposed
    pub fn resize(&self, width: u32) {
        self.width.store(width.max(1), Ordering::SeqCst);
    }

    pub fn logger(&self) -> &Arc<dyn EventLogger> {
        &self.logger
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn open(&self) {
        if !self.visible.swap(true, Ordering::SeqCst) {
            self.logger.window_opened(Self::NAME);
        }
    }
}

impl fmt::Debug for CustomerWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerWindow")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("visible", &self.is_visible())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl UiObject for CustomerWindow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn show_modal(&self) -> UserChoice {
        self.open();
        let choice = self.interaction.await_choice(Self::NAME);
        self.close();
        choice
    }

    fn show_non_modal(&self) {
        self.open();
    }

    fn close(&self) {
        if self.visible.swap(false, Ordering::SeqCst) {
            self.logger.window_closed(Self::NAME);
        }
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.close();

        let saved = self
            .settings
            .write(WIDTH_SETTING, &self.width())
            .and_then(|_| self.settings.flush());
        if let Err(e) = saved {
            self.logger.error(&format!("Failed to save customer window settings: {}", e));
        }
    }
}
