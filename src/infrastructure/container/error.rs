//! 容器错误类型

use super::key::CapabilityKey;
use thiserror::Error;

/// Error type returned by construction closures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution failure
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No binding registered for the key
    #[error("Capability '{key}' is not registered{}", available_hint(.available))]
    UnregisteredCapability {
        key: CapabilityKey,
        available: Vec<CapabilityKey>,
    },

    /// A key was requested while it was already under construction on the same path
    #[error("Circular dependency detected: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<CapabilityKey> },

    /// The binding's own construction logic failed
    #[error("Failed to construct '{key}': {cause}")]
    ConstructionFailed {
        key: CapabilityKey,
        #[source]
        cause: BoxError,
    },

    /// The instance registered under the key is not of the requested type
    #[error("Capability '{key}' does not resolve to '{expected}'")]
    TypeMismatch {
        key: CapabilityKey,
        expected: &'static str,
    },
}

impl ResolveError {
    pub fn unregistered(key: CapabilityKey) -> Self {
        ResolveError::UnregisteredCapability {
            key,
            available: Vec::new(),
        }
    }

    /// Key the error is about; for cycles, the key that closed the loop
    pub fn key(&self) -> Option<&CapabilityKey> {
        match self {
            ResolveError::UnregisteredCapability { key, .. }
            | ResolveError::ConstructionFailed { key, .. }
            | ResolveError::TypeMismatch { key, .. } => Some(key),
            ResolveError::CircularDependency { cycle } => cycle.last(),
        }
    }

    pub fn is_unregistered(&self, name: &str) -> bool {
        matches!(self, ResolveError::UnregisteredCapability { key, .. } if key.name() == name)
    }
}

fn available_hint(available: &[CapabilityKey]) -> String {
    if available.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = available.iter().map(CapabilityKey::name).collect();
    format!(". Available capabilities: {}", names.join(", "))
}

fn format_cycle(cycle: &[CapabilityKey]) -> String {
    let names: Vec<&str> = cycle.iter().map(CapabilityKey::name).collect();
    names.join(" -> ")
}
