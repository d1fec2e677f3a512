use crate::domain::interfaces::ui::{InteractionDriver, UserChoice};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays queued choices, then answers with a fixed default
#[derive(Debug)]
pub struct ScriptedInteraction {
    script: Mutex<VecDeque<UserChoice>>,
    default: UserChoice,
}

impl ScriptedInteraction {
    pub fn new(default: UserChoice) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default,
        }
    }

    pub fn with_script(default: UserChoice, script: impl IntoIterator<Item = UserChoice>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            default,
        }
    }

    pub fn push(&self, choice: UserChoice) {
        self.script.lock().push_back(choice);
    }

    /// Choices not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl InteractionDriver for ScriptedInteraction {
    fn await_choice(&self, window: &str) -> UserChoice {
        let choice = self.script.lock().pop_front().unwrap_or(self.default);
        tracing::debug!(window, choice = %choice, "Interaction answered");
        choice
    }
}
