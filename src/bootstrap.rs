//! Application wiring
//!
//! Registers every collaborator and window under its well-known key. Each
//! capability gets exactly one lifetime here and is never re-registered later.

use crate::config::{AppConfig, SettingsBackend};
use crate::errors::AppError;
use crate::domain::interfaces::logging::EventLogger;
use crate::domain::interfaces::settings::SettingsStore;
use crate::domain::interfaces::ui::{InteractionDriver, UserChoice};
use crate::infrastructure::container::{CapabilityKey, Container, Key, Lifetime};
use crate::infrastructure::factory::WindowFactory;
use crate::infrastructure::logger::TracingEventLogger;
use crate::infrastructure::settings::{MemorySettingsStore, TomlSettingsStore};
use crate::logging::OperationTimer;
use crate::windows::{AboutDialog, CustomerWindow, OpenWindowList, ScriptedInteraction};
use std::sync::Arc;
use uuid::Uuid;

pub const LOGGING: Key<Arc<dyn EventLogger>> = Key::new("logging");
pub const SETTINGS: Key<Arc<dyn SettingsStore>> = Key::new("settings");
pub const INTERACTION: Key<Arc<dyn InteractionDriver>> = Key::new("interaction");

pub const CUSTOMER_WINDOW: Key<Arc<CustomerWindow>> = Key::new("customer-window");
pub const ABOUT_DIALOG: Key<Arc<AboutDialog>> = Key::new("about-dialog");

/// Populate `container` with the application's bindings
pub fn configure(container: &Container, config: &AppConfig) {
    let timer = OperationTimer::new("bootstrap.configure");

    container.register(&LOGGING, Lifetime::Shared, |_| {
        Ok(Arc::new(TracingEventLogger::new()) as Arc<dyn EventLogger>)
    });

    match config.settings.backend {
        SettingsBackend::File => {
            let path = config.settings.path.clone();
            container.register(&SETTINGS, Lifetime::Shared, move |_| {
                let store = TomlSettingsStore::open(path.clone())?;
                Ok(Arc::new(store) as Arc<dyn SettingsStore>)
            });
        }
        SettingsBackend::Memory => {
            container.register(&SETTINGS, Lifetime::Shared, |_| {
                Ok(Arc::new(MemorySettingsStore::new()) as Arc<dyn SettingsStore>)
            });
        }
    }

    let default_choice = config.ui.default_choice;
    container.register(&INTERACTION, Lifetime::Shared, move |_| {
        Ok(Arc::new(ScriptedInteraction::new(default_choice)) as Arc<dyn InteractionDriver>)
    });

    container.register_ui_object(&CUSTOMER_WINDOW, Lifetime::PerRequest, |r| {
        let window = CustomerWindow::new(r.resolve(&LOGGING)?, r.resolve(&SETTINGS)?, r.resolve(&INTERACTION)?)?;
        Ok(window)
    });
    container.register_ui_object(&ABOUT_DIALOG, Lifetime::Shared, |r| {
        Ok(AboutDialog::new(r.resolve(&INTERACTION)?))
    });

    timer.finish();
    tracing::info!(
        capabilities = container.registered_keys().len(),
        settings = ?config.settings.backend,
        "Container configured"
    );
}

/// Result of showing a window picked by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// Modal window dismissed with this choice
    Dismissed(UserChoice),
    /// Non-modal window left open in the caller's list
    Opened { name: String, id: Uuid },
}

/// Show the window registered under `window`
pub fn show_window(
    factory: &WindowFactory<'_>,
    window: &str,
    modal: bool,
    open_windows: &OpenWindowList,
) -> Result<ShowOutcome, AppError> {
    let key = CapabilityKey::runtime(window);
    if modal {
        return Ok(ShowOutcome::Dismissed(factory.show_modal_by_runtime_key(&key)?));
    }

    let instance = factory.show_non_modal_by_runtime_key(&key)?;
    let outcome = ShowOutcome::Opened {
        name: instance.name().to_string(),
        id: instance.id(),
    };
    open_windows.track(instance);
    Ok(outcome)
}
