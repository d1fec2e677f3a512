//! 共享实例缓存
//!
//! One `OnceCell` per key: concurrent first resolutions of the same key run a
//! single construction and everybody gets its result. Cells are cloned out of the
//! map before initialization, so constructing one key never holds a shard lock
//! that another key might need.

use super::key::CapabilityKey;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased, reference-counted instance
#[derive(Clone)]
pub struct Instance(Arc<dyn Any + Send + Sync>);

impl Instance {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance")
            .field(&(Arc::as_ptr(&self.0) as *const ()))
            .finish()
    }
}

/// Cache of constructed `Shared` instances; entries are never evicted
#[derive(Default)]
pub struct InstanceCache {
    cells: DashMap<CapabilityKey, Arc<OnceCell<Instance>>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Already constructed instance for `key`
    pub fn get(&self, key: &CapabilityKey) -> Option<Instance> {
        self.cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached instance or run `create` exactly once to fill it.
    ///
    /// The flag is `true` when this call performed the construction. A failed
    /// `create` leaves the slot empty so a later call can try again.
    pub fn get_or_try_create<E, F>(&self, key: &CapabilityKey, create: F) -> Result<(Instance, bool), E>
    where
        F: FnOnce() -> Result<Instance, E>,
    {
        let cell = self
            .cells
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let mut created = false;
        let instance = cell.get_or_try_init(|| {
            created = true;
            create()
        })?;
        Ok((instance.clone(), created))
    }

    /// Number of constructed instances
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_instance_identity() {
        let a = Instance::new(String::from("value"));
        let b = a.clone();
        let c = Instance::new(String::from("value"));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("value"));
        assert!(a.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_failed_creation_leaves_no_entry() {
        let cache = InstanceCache::new();
        let key = CapabilityKey::new("flaky");

        let first: Result<_, &str> = cache.get_or_try_create(&key, || Err("boom"));
        assert!(first.is_err());
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());

        let (instance, created) = cache
            .get_or_try_create::<&str, _>(&key, || Ok(Instance::new(7u32)))
            .unwrap();
        assert!(created);
        assert_eq!(instance.downcast_ref::<u32>(), Some(&7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_creation_runs_once() {
        let cache = Arc::new(InstanceCache::new());
        let key = CapabilityKey::new("shared");
        let constructions = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let key = key.clone();
                let constructions = constructions.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_try_create::<(), _>(&key, || {
                            constructions.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok(Instance::new(42u64))
                        })
                        .unwrap()
                        .0
                })
            })
            .collect();

        let instances: Vec<Instance> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
    }
}
