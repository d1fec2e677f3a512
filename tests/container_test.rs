//! 容器解析行为测试
//!
//! Lifetimes, re-registration, failure propagation and concurrent first resolution.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use winject::infrastructure::container::{BoxError, CapabilityKey, Container, Key, Lifetime, ResolveError};

#[derive(Debug)]
struct Service {
    label: &'static str,
}

#[derive(Debug)]
struct Pair {
    left: Arc<Service>,
    right: Arc<Service>,
}

const LEFT: Key<Arc<Service>> = Key::new("left");
const RIGHT: Key<Arc<Service>> = Key::new("right");
const PAIR: Key<Arc<Pair>> = Key::new("pair");

fn counting(container: &Container, key: &Key<Arc<Service>>, lifetime: Lifetime, label: &'static str) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    container.register(key, lifetime, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Service { label }))
    });
    count
}

#[test]
fn test_per_request_returns_distinct_instances() {
    let container = Container::new();
    let built = counting(&container, &LEFT, Lifetime::PerRequest, "left");

    let first = container.resolve(&LEFT).unwrap();
    let second = container.resolve(&LEFT).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert_eq!(container.stats().cached_instances, 0);
}

#[test]
fn test_shared_is_identical_across_dependents() {
    let container = Container::new();
    let built = counting(&container, &LEFT, Lifetime::Shared, "left");
    container.register(&PAIR, Lifetime::PerRequest, |r| {
        Ok(Arc::new(Pair {
            left: r.resolve(&LEFT)?,
            right: r.resolve(&LEFT)?,
        }))
    });

    let direct = container.resolve(&LEFT).unwrap();
    let pair = container.resolve(&PAIR).unwrap();
    let again = container.resolve(&LEFT).unwrap();

    assert!(Arc::ptr_eq(&direct, &pair.left));
    assert!(Arc::ptr_eq(&direct, &pair.right));
    assert!(Arc::ptr_eq(&direct, &again));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dependencies_receive_exactly_registered_instances() {
    let container = Container::new();
    let left = Arc::new(Service { label: "left" });
    let right = Arc::new(Service { label: "right" });
    container.register_instance(&LEFT, left.clone());
    container.register_instance(&RIGHT, right.clone());
    container.register(&PAIR, Lifetime::PerRequest, |r| {
        Ok(Arc::new(Pair {
            left: r.resolve(&LEFT)?,
            right: r.resolve(&RIGHT)?,
        }))
    });

    let pair = container.resolve(&PAIR).unwrap();
    assert!(Arc::ptr_eq(&pair.left, &left));
    assert!(Arc::ptr_eq(&pair.right, &right));
    assert_eq!(pair.right.label, "right");
}

#[test]
fn test_reregistration_keeps_cached_shared_instance() {
    let container = Container::new();
    counting(&container, &LEFT, Lifetime::Shared, "first");
    let cached = container.resolve(&LEFT).unwrap();

    let replacement = counting(&container, &LEFT, Lifetime::Shared, "second");
    let after = container.resolve(&LEFT).unwrap();

    assert!(Arc::ptr_eq(&cached, &after));
    assert_eq!(after.label, "first");
    assert_eq!(replacement.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reregistration_before_first_resolution_wins() {
    let container = Container::new();
    let original = counting(&container, &LEFT, Lifetime::Shared, "first");
    counting(&container, &LEFT, Lifetime::Shared, "second");

    assert_eq!(container.resolve(&LEFT).unwrap().label, "second");
    assert_eq!(original.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reregistration_as_per_request_builds_fresh_instances() {
    let container = Container::new();
    counting(&container, &LEFT, Lifetime::Shared, "first");
    let cached = container.resolve(&LEFT).unwrap();

    counting(&container, &LEFT, Lifetime::PerRequest, "second");
    let fresh = container.resolve(&LEFT).unwrap();

    assert!(!Arc::ptr_eq(&cached, &fresh));
    assert_eq!(fresh.label, "second");
}

#[test]
fn test_unregistered_key_is_named() {
    let container = Container::new();
    counting(&container, &LEFT, Lifetime::Shared, "left");

    match container.resolve_instance(&CapabilityKey::runtime("unknown-window")) {
        Err(ResolveError::UnregisteredCapability { key, available }) => {
            assert_eq!(key.name(), "unknown-window");
            assert_eq!(available, vec![LEFT.capability().clone()]);
        }
        other => panic!("expected UnregisteredCapability, got {:?}", other),
    }
}

#[test]
fn test_missing_nested_dependency_keeps_root_cause() {
    let container = Container::new();
    counting(&container, &LEFT, Lifetime::Shared, "left");
    container.register(&PAIR, Lifetime::Shared, |r| {
        Ok(Arc::new(Pair {
            left: r.resolve(&LEFT)?,
            right: r.resolve(&RIGHT)?,
        }))
    });

    let err = container.resolve(&PAIR).unwrap_err();
    assert!(err.is_unregistered("right"), "unexpected error: {}", err);
    assert_eq!(container.stats().cached_instances, 1);
}

#[test]
fn test_two_node_cycle_names_both_keys() {
    let a: Key<u8> = Key::new("a");
    let b: Key<u8> = Key::new("b");
    let container = Container::new();
    container.register(&a, Lifetime::PerRequest, |r| Ok(r.resolve(&Key::<u8>::new("b"))?));
    container.register(&b, Lifetime::PerRequest, |r| Ok(r.resolve(&Key::<u8>::new("a"))?));

    match container.resolve(&a) {
        Err(ResolveError::CircularDependency { cycle }) => {
            assert!(cycle.contains(a.capability()));
            assert!(cycle.contains(b.capability()));
            assert_eq!(cycle.first(), cycle.last());
        }
        other => panic!("expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let a: Key<u8> = Key::new("a");
    let container = Container::new();
    container.register(&a, Lifetime::Shared, |r| Ok(r.resolve(&Key::<u8>::new("a"))?));

    let err = container.resolve(&a).unwrap_err();
    assert_eq!(err.to_string(), "Circular dependency detected: a -> a");
}

#[test]
fn test_construction_failure_is_retried_later() {
    let container = Container::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    container.register(&LEFT, Lifetime::Shared, move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err::<Arc<Service>, BoxError>("disk not ready".into());
        }
        Ok(Arc::new(Service { label: "left" }))
    });

    match container.resolve(&LEFT) {
        Err(ResolveError::ConstructionFailed { key, cause }) => {
            assert_eq!(key.name(), "left");
            assert_eq!(cause.to_string(), "disk not ready");
        }
        other => panic!("expected ConstructionFailed, got {:?}", other),
    }
    assert_eq!(container.stats().cached_instances, 0);

    let first = container.resolve(&LEFT).unwrap();
    let second = container.resolve(&LEFT).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_racing_first_resolutions_construct_once() {
    let container = Arc::new(Container::new());
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    container.register(&LEFT, Lifetime::Shared, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(25));
        Ok(Arc::new(Service { label: "left" }))
    });

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.resolve(&LEFT).unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<Service>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
}

#[test]
fn test_background_thread_is_not_mistaken_for_a_cycle() {
    let container = Arc::new(Container::new());
    let slow: Key<Arc<Service>> = Key::new("slow");
    let barrier = Arc::new(Barrier::new(2));
    let gate = barrier.clone();
    container.register(&slow, Lifetime::PerRequest, move |_| {
        gate.wait();
        thread::sleep(Duration::from_millis(10));
        Ok(Arc::new(Service { label: "slow" }))
    });

    // Both threads are inside the same key's construction at once.
    let background = {
        let container = container.clone();
        thread::spawn(move || container.resolve(&Key::<Arc<Service>>::new("slow")).map(|s| s.label))
    };
    let foreground = container.resolve(&slow).map(|s| s.label);

    assert_eq!(foreground.unwrap(), "slow");
    assert_eq!(background.join().unwrap().unwrap(), "slow");
}

/// Shared binding whose first construction meets the other thread at `barrier`
/// before resolving `dependency`
fn meet_then_resolve(container: &Container, key: &Key<u8>, dependency: &'static str, barrier: Arc<Barrier>) {
    let first = AtomicBool::new(true);
    container.register(key, Lifetime::Shared, move |r| {
        if first.swap(false, Ordering::SeqCst) {
            barrier.wait();
        }
        Ok(r.resolve(&Key::<u8>::new(dependency))?)
    });
}

#[test]
fn test_cycle_split_across_threads_fails_instead_of_blocking() {
    let a: Key<u8> = Key::new("a");
    let b: Key<u8> = Key::new("b");
    let container = Arc::new(Container::new());
    let barrier = Arc::new(Barrier::new(2));
    meet_then_resolve(&container, &a, "b", barrier.clone());
    meet_then_resolve(&container, &b, "a", barrier);

    // One thread starts building "a", the other "b"; each then needs the other.
    let (sender, receiver) = mpsc::channel();
    for name in ["a", "b"] {
        let container = container.clone();
        let sender = sender.clone();
        thread::spawn(move || {
            let result = container.resolve(&Key::<u8>::new(name));
            let _ = sender.send((name, result));
        });
    }

    for _ in 0..2 {
        let (name, result) = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("resolutions deadlocked");
        match result {
            Err(ResolveError::CircularDependency { cycle }) => {
                assert!(cycle.contains(a.capability()), "{}: {:?}", name, cycle);
                assert!(cycle.contains(b.capability()), "{}: {:?}", name, cycle);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("{}: expected CircularDependency, got {:?}", name, other),
        }
    }
    assert_eq!(container.stats().cached_instances, 0);
}

#[test]
fn test_slow_construction_does_not_block_other_keys() {
    let container = Arc::new(Container::new());
    let slow: Key<Arc<Service>> = Key::new("slow");
    let (started, entered) = mpsc::channel();
    container.register(&slow, Lifetime::Shared, move |_| {
        let _ = started.send(());
        thread::sleep(Duration::from_millis(800));
        Ok(Arc::new(Service { label: "slow" }))
    });
    counting(&container, &LEFT, Lifetime::Shared, "left");
    counting(&container, &RIGHT, Lifetime::PerRequest, "right");
    let cached = container.resolve(&LEFT).unwrap();

    let background = {
        let container = container.clone();
        thread::spawn(move || container.resolve(&Key::<Arc<Service>>::new("slow")).map(|s| s.label))
    };
    entered.recv_timeout(Duration::from_secs(5)).unwrap();

    let begin = Instant::now();
    let again = container.resolve(&LEFT).unwrap();
    let fresh = container.resolve(&RIGHT).unwrap();
    let elapsed = begin.elapsed();

    assert!(Arc::ptr_eq(&cached, &again));
    assert_eq!(fresh.label, "right");
    assert!(elapsed < Duration::from_millis(400), "other keys waited {:?}", elapsed);
    assert_eq!(background.join().unwrap().unwrap(), "slow");
}
