//! 递归解析器
//!
//! A [`Resolver`] is created for every top-level resolution and handed to each
//! construction closure, so dependencies resolve through the same call path and
//! share one resolution stack. Concurrent resolutions never see each other's stack.

use super::cache::Instance;
use super::error::ResolveError;
use super::key::{CapabilityKey, Key};
use super::registry::{Binding, Lifetime};
use super::wait_graph::ResolutionId;
use super::Container;
use std::cell::RefCell;

/// Per-call-path resolution context
pub struct Resolver<'c> {
    container: &'c Container,
    id: ResolutionId,
    stack: RefCell<Vec<CapabilityKey>>,
}

/// Pops its key when dropped, on success, failure or unwind alike
struct StackFrame<'r> {
    stack: &'r RefCell<Vec<CapabilityKey>>,
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            id: container.builds.next_resolution(),
            stack: RefCell::new(Vec::new()),
        }
    }

    /// Resolve a typed capability
    pub fn resolve<T>(&self, key: &Key<T>) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let instance = self.resolve_instance(key.capability())?;
        instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ResolveError::TypeMismatch {
                key: key.capability().clone(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve a capability without fixing its type
    pub fn resolve_instance(&self, key: &CapabilityKey) -> Result<Instance, ResolveError> {
        self.container.stats.record_resolution();
        let result = self.resolve_uncounted(key);
        if result.is_err() {
            self.container.stats.record_failure();
        }
        result
    }

    /// Keys currently under construction, outermost first
    pub fn path(&self) -> Vec<CapabilityKey> {
        self.stack.borrow().clone()
    }

    pub fn container(&self) -> &'c Container {
        self.container
    }

    fn resolve_uncounted(&self, key: &CapabilityKey) -> Result<Instance, ResolveError> {
        if let Some(cycle) = self.cycle_through(key) {
            tracing::debug!(key = %key, depth = cycle.len(), "Circular dependency detected");
            return Err(ResolveError::CircularDependency { cycle });
        }

        let binding = self.container.registry.lookup(key)?;

        match binding.lifetime() {
            Lifetime::Shared => {
                if let Some(instance) = self.container.cache.get(key) {
                    self.container.stats.record_cache_hit();
                    tracing::trace!(key = %key, "Shared instance served from cache");
                    return Ok(instance);
                }
                self.container.stats.record_cache_miss();

                // Another resolution may hold this key's cell; never block on one
                // that is in turn waiting for something this path is building.
                let _waiting = self
                    .container
                    .builds
                    .wait_for(self.id, key, &self.stack.borrow())
                    .map_err(|cycle| {
                        tracing::debug!(key = %key, depth = cycle.len(), "Circular dependency across resolutions");
                        ResolveError::CircularDependency { cycle }
                    })?;

                let _frame = self.enter(key);
                let (instance, created) = self.container.cache.get_or_try_create(key, || {
                    let _building = self.container.builds.building(self.id, key);
                    self.construct(&binding)
                })?;
                if !created {
                    tracing::trace!(key = %key, "Shared instance built by a concurrent resolution");
                }
                Ok(instance)
            }
            Lifetime::PerRequest => {
                let _frame = self.enter(key);
                self.construct(&binding)
            }
        }
    }

    /// Stack slice from the first occurrence of `key` to the top, closed with `key`
    fn cycle_through(&self, key: &CapabilityKey) -> Option<Vec<CapabilityKey>> {
        let stack = self.stack.borrow();
        let start = stack.iter().position(|entry| entry == key)?;
        let mut cycle: Vec<CapabilityKey> = stack[start..].to_vec();
        cycle.push(key.clone());
        Some(cycle)
    }

    fn enter(&self, key: &CapabilityKey) -> StackFrame<'_> {
        self.stack.borrow_mut().push(key.clone());
        StackFrame { stack: &self.stack }
    }

    fn construct(&self, binding: &Binding) -> Result<Instance, ResolveError> {
        tracing::debug!(
            key = %binding.key(),
            lifetime = %binding.lifetime(),
            depth = self.stack.borrow().len(),
            "Constructing instance"
        );
        let instance = binding.construct(self).map_err(|cause| {
            // Failures of nested resolutions keep their own kind and key.
            match cause.downcast::<ResolveError>() {
                Ok(nested) => *nested,
                Err(cause) => ResolveError::ConstructionFailed {
                    key: binding.key().clone(),
                    cause,
                },
            }
        })?;
        self.container.stats.record_construction();
        Ok(instance)
    }
}
