use crate::domain::interfaces::ui::{InteractionDriver, UiObject, UserChoice};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Version dialog; depends on nothing but the interaction driver
pub struct AboutDialog {
    id: Uuid,
    interaction: Arc<dyn InteractionDriver>,
    visible: AtomicBool,
}

impl AboutDialog {
    pub const NAME: &'static str = "about-dialog";

    pub fn new(interaction: Arc<dyn InteractionDriver>) -> Self {
        Self {
            id: Uuid::new_v4(),
            interaction,
            visible: AtomicBool::new(false),
        }
    }

    pub fn text(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl fmt::Debug for AboutDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AboutDialog")
            .field("id", &self.id)
            .field("visible", &self.is_visible())
            .finish()
    }
}

impl UiObject for AboutDialog {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn show_modal(&self) -> UserChoice {
        self.visible.store(true, Ordering::SeqCst);
        let choice = self.interaction.await_choice(Self::NAME);
        self.visible.store(false, Ordering::SeqCst);
        choice
    }

    fn show_non_modal(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
