//! 事件日志实现

use crate::domain::interfaces::logging::{EventLevel, EventLogger};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Forwards application events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLogger;

impl TracingEventLogger {
    pub fn new() -> Self {
        Self
    }
}

impl EventLogger for TracingEventLogger {
    fn record(&self, level: EventLevel, message: &str) {
        match level {
            EventLevel::Info => tracing::info!(target: "winject::events", "{}", message),
            EventLevel::Warning => tracing::warn!(target: "winject::events", "{}", message),
            EventLevel::Error => tracing::error!(target: "winject::events", "{}", message),
        }
    }

    fn window_opened(&self, window: &str) {
        tracing::info!(target: "winject::events", window, "Window opened");
    }

    fn window_closed(&self, window: &str) {
        tracing::info!(target: "winject::events", window, "Window closed");
    }
}

/// What a recorded event was about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message(EventLevel),
    WindowOpened,
    WindowClosed,
}

#[derive(Debug, Clone)]
pub struct LoggedEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Message text, or the window name for open/close events
    pub text: String,
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingEventLogger {
    events: Mutex<Vec<LoggedEvent>>,
}

impl RecordingEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: EventKind, text: &str) {
        self.events.lock().push(LoggedEvent {
            timestamp: Utc::now(),
            kind,
            text: text.to_string(),
        });
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.lock().clone()
    }

    pub fn messages(&self, level: EventLevel) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind == EventKind::Message(level))
            .map(|event| event.text.clone())
            .collect()
    }

    pub fn opened_count(&self, window: &str) -> usize {
        self.count(EventKind::WindowOpened, window)
    }

    pub fn closed_count(&self, window: &str) -> usize {
        self.count(EventKind::WindowClosed, window)
    }

    fn count(&self, kind: EventKind, window: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind == kind && event.text == window)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventLogger for RecordingEventLogger {
    fn record(&self, level: EventLevel, message: &str) {
        self.push(EventKind::Message(level), message);
    }

    fn window_opened(&self, window: &str) {
        self.push(EventKind::WindowOpened, window);
    }

    fn window_closed(&self, window: &str) {
        self.push(EventKind::WindowClosed, window);
    }
}
