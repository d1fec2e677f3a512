use crate::domain::interfaces::ui::UiObject;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Non-modal windows the application keeps alive
#[derive(Default)]
pub struct OpenWindowList {
    windows: Mutex<Vec<Arc<dyn UiObject>>>,
}

impl OpenWindowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, window: Arc<dyn UiObject>) {
        tracing::debug!(window = window.name(), id = %window.id(), "Tracking open window");
        self.windows.lock().push(window);
    }

    /// Stop tracking the window with `id`
    pub fn release(&self, id: Uuid) -> Option<Arc<dyn UiObject>> {
        let mut windows = self.windows.lock();
        let index = windows.iter().position(|window| window.id() == id)?;
        Some(windows.remove(index))
    }

    /// Drop every window that is no longer visible; returns how many were dropped
    pub fn prune_closed(&self) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|window| window.is_visible());
        before - windows.len()
    }

    /// Close and dispose every tracked window
    pub fn close_all(&self) {
        let windows: Vec<Arc<dyn UiObject>> = self.windows.lock().drain(..).collect();
        for window in windows {
            window.close();
            if Arc::strong_count(&window) == 1 {
                window.dispose();
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.windows.lock().iter().map(|window| window.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }
}
