//! 容器解析性能基准测试

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use winject::infrastructure::container::{CapabilityKey, Container, Key, Lifetime};

#[derive(Clone)]
struct SimpleService {
    value: u64,
}

const SHARED: Key<Arc<SimpleService>> = Key::new("shared");
const PER_REQUEST: Key<Arc<SimpleService>> = Key::new("per-request");

fn bench_cached_resolution(c: &mut Criterion) {
    let container = Container::new();
    container.register(&SHARED, Lifetime::Shared, |_| Ok(Arc::new(SimpleService { value: 42 })));
    container.register(&PER_REQUEST, Lifetime::PerRequest, |_| {
        Ok(Arc::new(SimpleService { value: 7 }))
    });
    container.resolve(&SHARED).unwrap();

    let mut group = c.benchmark_group("resolution");
    group.bench_function("shared_cached", |b| {
        b.iter(|| black_box(container.resolve(&SHARED).unwrap().value))
    });
    group.bench_function("per_request", |b| {
        b.iter(|| black_box(container.resolve(&PER_REQUEST).unwrap().value))
    });
    group.finish();
}

/// Chain of per-request bindings, each depending on the previous one
fn chain(depth: usize) -> (Container, CapabilityKey) {
    let container = Container::new();
    let root: Key<Arc<SimpleService>> = Key::new("chain-0");
    container.register(&root, Lifetime::Shared, |_| Ok(Arc::new(SimpleService { value: 0 })));

    for level in 1..depth {
        let key: Key<Arc<SimpleService>> = Key::from_runtime(format!("chain-{}", level));
        let dependency: Key<Arc<SimpleService>> = Key::from_runtime(format!("chain-{}", level - 1));
        container.register(&key, Lifetime::PerRequest, move |r| {
            let below = r.resolve(&dependency)?;
            Ok(Arc::new(SimpleService { value: below.value + 1 }))
        });
    }
    (container, CapabilityKey::runtime(format!("chain-{}", depth - 1)))
}

fn bench_dependency_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_depth");
    for depth in [1usize, 4, 16, 64] {
        let (container, top) = chain(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &top, |b, top| {
            b.iter(|| black_box(container.resolve_instance(top).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cached_resolution, bench_dependency_depth);
criterion_main!(benches);
