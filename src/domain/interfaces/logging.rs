//! 日志协作者接口

use std::fmt;

/// Severity of an application event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventLevel::Info => f.write_str("info"),
            EventLevel::Warning => f.write_str("warning"),
            EventLevel::Error => f.write_str("error"),
        }
    }
}

/// Event sink windows report to
pub trait EventLogger: Send + Sync {
    /// Record an application event
    fn record(&self, level: EventLevel, message: &str);

    /// A named UI object became visible
    fn window_opened(&self, window: &str);

    /// A named UI object was closed or disposed
    fn window_closed(&self, window: &str);

    fn info(&self, message: &str) {
        self.record(EventLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(EventLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(EventLevel::Error, message);
    }
}
