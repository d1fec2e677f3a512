//! 窗口工厂
//!
//! Typed facade over the container for window-like capabilities. Every
//! resolution failure is reported as [`FactoryError::FactoryResolutionFailed`]
//! naming the key the caller asked for, with the root cause as its source.

use super::container::{
    CapabilityKey, CapabilityKind, Container, Key, ResolveError,
};
use crate::domain::interfaces::ui::{UiObject, UserChoice};
use crate::logging::OperationTimer;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactoryError {
    /// The runtime key names a capability that cannot be displayed
    #[error("Capability '{key}' is not a UI object (registered as {kind:?})")]
    InvalidCapabilityKind {
        key: CapabilityKey,
        kind: CapabilityKind,
    },

    #[error("Failed to create '{key}': {cause}")]
    FactoryResolutionFailed {
        key: CapabilityKey,
        #[source]
        cause: ResolveError,
    },
}

impl FactoryError {
    /// Key the caller requested
    pub fn key(&self) -> &CapabilityKey {
        match self {
            FactoryError::InvalidCapabilityKind { key, .. }
            | FactoryError::FactoryResolutionFailed { key, .. } => key,
        }
    }

    /// Underlying resolution failure, if any
    pub fn resolve_error(&self) -> Option<&ResolveError> {
        match self {
            FactoryError::FactoryResolutionFailed { cause, .. } => Some(cause),
            FactoryError::InvalidCapabilityKind { .. } => None,
        }
    }

    fn resolution(key: &CapabilityKey, cause: ResolveError) -> Self {
        FactoryError::FactoryResolutionFailed {
            key: key.clone(),
            cause,
        }
    }
}

/// Creates and displays UI objects registered in a [`Container`]
#[derive(Clone, Copy)]
pub struct WindowFactory<'c> {
    container: &'c Container,
}

impl<'c> WindowFactory<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// Resolve a window without displaying it
    pub fn create<W>(&self, key: &Key<Arc<W>>) -> Result<Arc<W>, FactoryError>
    where
        W: UiObject + 'static,
    {
        let timer = OperationTimer::new("factory.create").with_metadata("key", key.name());
        let result = self
            .container
            .resolve(key)
            .map_err(|cause| FactoryError::resolution(key.capability(), cause));
        timer.finish();
        result
    }

    /// Resolve a window whose key is only known at runtime.
    ///
    /// Keys bound to plain services are rejected before anything is constructed.
    pub fn create_by_runtime_key(&self, key: &CapabilityKey) -> Result<Arc<dyn UiObject>, FactoryError> {
        let timer = OperationTimer::new("factory.create_by_runtime_key").with_metadata("key", key.name());

        let binding = self
            .container
            .lookup(key)
            .map_err(|cause| FactoryError::resolution(key, cause))?;
        if binding.kind() != CapabilityKind::UiObject {
            tracing::warn!(key = %key, kind = ?binding.kind(), "Runtime key does not name a UI object");
            return Err(FactoryError::InvalidCapabilityKind {
                key: key.clone(),
                kind: binding.kind(),
            });
        }

        let instance = self
            .container
            .resolve_instance(key)
            .map_err(|cause| FactoryError::resolution(key, cause))?;
        // The binding may have been replaced meanwhile; either one can describe the instance.
        let window = self
            .container
            .lookup(key)
            .ok()
            .and_then(|binding| binding.as_ui_object(&instance))
            .or_else(|| binding.as_ui_object(&instance))
            .ok_or_else(|| {
                FactoryError::resolution(
                    key,
                    ResolveError::TypeMismatch {
                        key: key.clone(),
                        expected: "dyn UiObject",
                    },
                )
            })?;
        timer.finish();
        Ok(window)
    }

    /// Create a window, show it modally and return how the user dismissed it.
    ///
    /// The window is disposed afterwards unless someone else still holds it,
    /// which is always the case for `Shared` windows.
    pub fn show_modal<W>(&self, key: &Key<Arc<W>>) -> Result<UserChoice, FactoryError>
    where
        W: UiObject + 'static,
    {
        let window = self.create(key)?;
        Ok(run_modal(window))
    }

    /// Create a window and show it without blocking; the caller keeps it alive.
    pub fn show_non_modal<W>(&self, key: &Key<Arc<W>>) -> Result<Arc<W>, FactoryError>
    where
        W: UiObject + 'static,
    {
        let window = self.create(key)?;
        window.show_non_modal();
        Ok(window)
    }

    /// [`show_modal`](Self::show_modal) for a runtime key
    pub fn show_modal_by_runtime_key(&self, key: &CapabilityKey) -> Result<UserChoice, FactoryError> {
        let window = self.create_by_runtime_key(key)?;
        Ok(run_modal(window))
    }

    /// [`show_non_modal`](Self::show_non_modal) for a runtime key
    pub fn show_non_modal_by_runtime_key(&self, key: &CapabilityKey) -> Result<Arc<dyn UiObject>, FactoryError> {
        let window = self.create_by_runtime_key(key)?;
        window.show_non_modal();
        Ok(window)
    }

    pub fn container(&self) -> &'c Container {
        self.container
    }
}

fn run_modal<W: UiObject + ?Sized>(window: Arc<W>) -> UserChoice {
    let choice = window.show_modal();
    if Arc::strong_count(&window) == 1 {
        window.dispose();
    } else {
        tracing::debug!(window = window.name(), "Modal window is still referenced, not disposing");
    }
    tracing::info!(window = window.name(), choice = %choice, "Modal window dismissed");
    choice
}
