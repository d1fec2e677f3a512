//! 能力标识
//!
//! A [`CapabilityKey`] names an abstract capability ("logging", "customer-window").
//! Two keys are equal when they name the same capability. [`Key<T>`] adds the Rust
//! type an instance of that capability resolves to.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Untyped capability identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityKey(Cow<'static, str>);

impl CapabilityKey {
    /// Key for a name known at compile time
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Key for a name computed at runtime (command line, settings, ...)
    pub fn runtime(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&'static str> for CapabilityKey {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CapabilityKey {
    fn from(name: String) -> Self {
        Self::runtime(name)
    }
}

/// Capability key bound to the type its instances resolve to
///
/// ```rust
/// use std::sync::Arc;
/// use winject::infrastructure::container::Key;
///
/// const GREETING: Key<Arc<String>> = Key::new("greeting");
/// assert_eq!(GREETING.name(), "greeting");
/// ```
pub struct Key<T> {
    key: CapabilityKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            key: CapabilityKey::new(name),
            _marker: PhantomData,
        }
    }

    /// Typed key with a name computed at runtime
    pub fn from_runtime(name: impl Into<String>) -> Self {
        Self {
            key: CapabilityKey::runtime(name),
            _marker: PhantomData,
        }
    }

    pub fn capability(&self) -> &CapabilityKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.key.name())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

impl<T> AsRef<CapabilityKey> for Key<T> {
    fn as_ref(&self) -> &CapabilityKey {
        &self.key
    }
}
