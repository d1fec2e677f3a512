//! 依赖解析容器
//!
//! Capabilities are registered under a [`CapabilityKey`] together with a
//! [`Lifetime`] and a construction closure. Resolution builds the object graph
//! on demand:
//! - `Shared` bindings are constructed once and cached for the life of the container
//! - `PerRequest` bindings are constructed on every resolution
//! - cycles are reported with the full chain of keys involved, including loops
//!   that span `Shared` constructions running on different threads
//!
//! Construction closures receive the [`Resolver`] of the current call path and
//! must use it (not the container) for their own dependencies.

pub mod cache;
pub mod error;
pub mod key;
pub mod registry;
pub mod resolver;
mod wait_graph;

pub use cache::{Instance, InstanceCache};
pub use error::{BoxError, ResolveError};
pub use key::{CapabilityKey, Key};
pub use registry::{Binding, CapabilityKind, Lifetime, Registry};
pub use resolver::Resolver;

use crate::domain::interfaces::ui::UiObject;
use registry::{FnConstructor, UiConstructor};
use wait_graph::WaitGraph;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Dependency resolution container
#[derive(Default)]
pub struct Container {
    registry: Registry,
    cache: InstanceCache,
    builds: WaitGraph,
    stats: InnerStats,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use winject::infrastructure::container::{Container, Key, Lifetime};
    ///
    /// const GREETING: Key<Arc<String>> = Key::new("greeting");
    ///
    /// let container = Container::new();
    /// container.register(&GREETING, Lifetime::Shared, |_| Ok(Arc::new(String::from("Hello"))));
    /// let greeting = container.resolve(&GREETING).unwrap();
    /// assert_eq!(greeting.as_str(), "Hello");
    /// ```
    pub fn register<T, F>(&self, key: &Key<T>, lifetime: Lifetime, construct: F)
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let binding = Binding::service(
            key.capability().clone(),
            lifetime,
            std::any::type_name::<T>(),
            Arc::new(FnConstructor::new(construct)),
        );
        self.insert(binding);
    }

    /// Register a window-like capability the factory can display
    pub fn register_ui_object<W, F>(&self, key: &Key<Arc<W>>, lifetime: Lifetime, construct: F)
    where
        W: UiObject + 'static,
        F: Fn(&Resolver<'_>) -> Result<W, BoxError> + Send + Sync + 'static,
    {
        let constructor = Arc::new(UiConstructor::new(construct));
        let binding = Binding::ui_object(
            key.capability().clone(),
            lifetime,
            std::any::type_name::<W>(),
            constructor.clone(),
            constructor,
        );
        self.insert(binding);
    }

    /// Register an already built value as a `Shared` capability
    pub fn register_instance<T>(&self, key: &Key<T>, value: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        self.register(key, Lifetime::Shared, move |_| Ok(value.clone()));
    }

    fn insert(&self, binding: Binding) {
        let key = binding.key().clone();
        let lifetime = binding.lifetime();
        match self.registry.insert(binding) {
            Some(previous) if self.cache.get(&key).is_some() => {
                tracing::warn!(
                    key = %key,
                    previous = %previous.lifetime(),
                    lifetime = %lifetime,
                    "Binding replaced after its shared instance was built; cached instance is kept"
                );
            }
            Some(_) => tracing::debug!(key = %key, lifetime = %lifetime, "Binding replaced"),
            None => tracing::debug!(key = %key, lifetime = %lifetime, "Binding registered"),
        }
    }

    /// Binding registered for `key`
    pub fn lookup(&self, key: &CapabilityKey) -> Result<Arc<Binding>, ResolveError> {
        self.registry.lookup(key)
    }

    /// Resolve a typed capability on a fresh call path
    pub fn resolve<T>(&self, key: &Key<T>) -> Result<T, ResolveError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Resolver::new(self).resolve(key)
    }

    /// Resolve a capability without fixing its type
    pub fn resolve_instance(&self, key: &CapabilityKey) -> Result<Instance, ResolveError> {
        Resolver::new(self).resolve_instance(key)
    }

    pub fn is_registered(&self, key: &CapabilityKey) -> bool {
        self.registry.contains(key)
    }

    /// Registered keys, sorted by name
    pub fn registered_keys(&self) -> Vec<CapabilityKey> {
        self.registry.keys()
    }

    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
            constructions: self.stats.constructions.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
            registered: self.registry.len(),
            cached_instances: self.cache.len(),
        }
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_CONTAINER: Container = Container::new();
}

/// Process-wide container, populated once at startup
pub fn global() -> &'static Container {
    &GLOBAL_CONTAINER
}

/// Internal atomic counters
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    constructions: AtomicU64,
    failures: AtomicU64,
}

impl InnerStats {
    fn record_resolution(&self) {
        self.total_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_construction(&self) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of container activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// Every resolve call, nested ones included
    pub total_resolutions: u64,
    /// Shared resolutions served from the cache
    pub cache_hits: u64,
    /// Shared resolutions that had to construct (or wait for a construction)
    pub cache_misses: u64,
    /// Successful constructions, both lifetimes
    pub constructions: u64,
    pub failures: u64,
    pub registered: usize,
    pub cached_instances: usize,
}

impl ContainerStats {
    /// Shared cache hit rate in `[0, 1]`
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    pub fn performance_summary(&self) -> String {
        format!(
            "Container: {} resolutions, {:.1}% shared cache hit rate, {} constructions, {} failures, {} registered, {} cached",
            self.total_resolutions,
            self.hit_rate() * 100.0,
            self.constructions,
            self.failures,
            self.registered,
            self.cached_instances
        )
    }
}
