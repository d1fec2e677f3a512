//! 绑定注册表
//!
//! Maps capability keys to their construction recipe. Registering a key twice
//! replaces the earlier binding; dependencies are only checked when resolving.

use super::cache::Instance;
use super::error::{BoxError, ResolveError};
use super::key::CapabilityKey;
use super::resolver::Resolver;
use crate::domain::interfaces::ui::UiObject;
use dashmap::DashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Instance lifetime policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance for the whole life of the container
    Shared,
    /// New instance on every resolution
    PerRequest,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Shared => f.pad("shared"),
            Lifetime::PerRequest => f.pad("per-request"),
        }
    }
}

/// What a binding produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Plain collaborator (logging, settings, ...)
    Service,
    /// Window-like object the factory can display
    UiObject,
}

/// Type-erased construction recipe
pub(crate) trait Construct: Send + Sync {
    fn construct(&self, resolver: &Resolver<'_>) -> Result<Instance, BoxError>;
}

/// Construction closure producing a `T`
pub(crate) struct FnConstructor<F, T> {
    construct: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<F, T> FnConstructor<F, T>
where
    F: Fn(&Resolver<'_>) -> Result<T, BoxError> + Send + Sync,
    T: Send + Sync + 'static,
{
    pub(crate) fn new(construct: F) -> Self {
        Self {
            construct,
            _phantom: PhantomData,
        }
    }
}

impl<F, T> Construct for FnConstructor<F, T>
where
    F: Fn(&Resolver<'_>) -> Result<T, BoxError> + Send + Sync,
    T: Send + Sync + 'static,
{
    fn construct(&self, resolver: &Resolver<'_>) -> Result<Instance, BoxError> {
        (self.construct)(resolver).map(Instance::new)
    }
}

/// Construction closure producing a UI object, stored as `Arc<W>`
pub(crate) struct UiConstructor<F, W> {
    construct: F,
    _phantom: PhantomData<fn() -> W>,
}

impl<F, W> UiConstructor<F, W>
where
    F: Fn(&Resolver<'_>) -> Result<W, BoxError> + Send + Sync,
    W: UiObject + 'static,
{
    pub(crate) fn new(construct: F) -> Self {
        Self {
            construct,
            _phantom: PhantomData,
        }
    }
}

impl<F, W> Construct for UiConstructor<F, W>
where
    F: Fn(&Resolver<'_>) -> Result<W, BoxError> + Send + Sync,
    W: UiObject + 'static,
{
    fn construct(&self, resolver: &Resolver<'_>) -> Result<Instance, BoxError> {
        (self.construct)(resolver).map(|window| Instance::new(Arc::new(window)))
    }
}

/// Recovers the `dyn UiObject` view of an `Arc<W>` instance
pub(crate) trait UiView: Send + Sync {
    fn view(&self, instance: &Instance) -> Option<Arc<dyn UiObject>>;
}

impl<F, W> UiView for UiConstructor<F, W>
where
    F: Send + Sync,
    W: UiObject + 'static,
{
    fn view(&self, instance: &Instance) -> Option<Arc<dyn UiObject>> {
        instance
            .downcast_ref::<Arc<W>>()
            .map(|window| window.clone() as Arc<dyn UiObject>)
    }
}

pub(crate) type ConstructFn = Arc<dyn Construct>;
pub(crate) type UiViewFn = Arc<dyn UiView>;

/// Registered recipe for one capability
pub struct Binding {
    key: CapabilityKey,
    lifetime: Lifetime,
    type_name: &'static str,
    construct: ConstructFn,
    ui_view: Option<UiViewFn>,
}

impl Binding {
    pub(crate) fn service(
        key: CapabilityKey,
        lifetime: Lifetime,
        type_name: &'static str,
        construct: ConstructFn,
    ) -> Self {
        Self {
            key,
            lifetime,
            type_name,
            construct,
            ui_view: None,
        }
    }

    pub(crate) fn ui_object(
        key: CapabilityKey,
        lifetime: Lifetime,
        type_name: &'static str,
        construct: ConstructFn,
        ui_view: UiViewFn,
    ) -> Self {
        Self {
            key,
            lifetime,
            type_name,
            construct,
            ui_view: Some(ui_view),
        }
    }

    pub fn key(&self) -> &CapabilityKey {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn kind(&self) -> CapabilityKind {
        if self.ui_view.is_some() {
            CapabilityKind::UiObject
        } else {
            CapabilityKind::Service
        }
    }

    /// Rust type name of the instances this binding produces
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn construct(&self, resolver: &Resolver<'_>) -> Result<Instance, BoxError> {
        self.construct.construct(resolver)
    }

    /// View an instance produced by this binding as a UI object
    pub(crate) fn as_ui_object(&self, instance: &Instance) -> Option<Arc<dyn UiObject>> {
        self.ui_view.as_ref().and_then(|ui| ui.view(instance))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("kind", &self.kind())
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Capability key to binding map
#[derive(Default)]
pub struct Registry {
    bindings: DashMap<CapabilityKey, Arc<Binding>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a binding, returning the one it replaced
    pub fn insert(&self, binding: Binding) -> Option<Arc<Binding>> {
        self.bindings.insert(binding.key.clone(), Arc::new(binding))
    }

    /// Binding for `key`; the shard guard is released before returning
    pub fn lookup(&self, key: &CapabilityKey) -> Result<Arc<Binding>, ResolveError> {
        match self.bindings.get(key) {
            Some(binding) => Ok(binding.value().clone()),
            None => Err(ResolveError::UnregisteredCapability {
                key: key.clone(),
                available: self.keys(),
            }),
        }
    }

    pub fn contains(&self, key: &CapabilityKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Registered keys, sorted by name
    pub fn keys(&self) -> Vec<CapabilityKey> {
        let mut keys: Vec<CapabilityKey> =
            self.bindings.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
