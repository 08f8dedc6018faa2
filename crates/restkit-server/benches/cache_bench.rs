use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use restkit_core::{RateScope, SystemClock};
use restkit_server::cache::{CacheConfig, CacheKeyBuilder, CacheOrchestrator};
use restkit_server::extractors::QueryParams;
use restkit_server::throttle::RateWindowTracker;
use restkit_store::MokaStore;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Crea un payload de lista con N elementos
fn create_test_payload(num_items: usize) -> serde_json::Value {
    let results: Vec<_> = (0..num_items)
        .map(|i| serde_json::json!({"id": i, "title": format!("Task {}", i), "status": "pending"}))
        .collect();
    serde_json::json!({"page": {"current": 1, "total_items": num_items}, "results": results})
}

/// Benchmark: construccion de keys de lista (digest de query params)
fn bench_list_key(c: &mut Criterion) {
    let keys = CacheKeyBuilder::new("todos");
    let mut group = c.benchmark_group("list_key_params");

    for params in [0, 4, 16].iter() {
        let query: QueryParams = (0..*params)
            .map(|i| (format!("param{}", i), format!("value-{}", i)))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(params), &query, |b, query| {
            b.iter(|| std::hint::black_box(keys.list(query)));
        });
    }

    group.finish();
}

/// Benchmark: get_or_set (hit)
fn bench_get_or_set_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = CacheOrchestrator::new(
        Arc::new(MokaStore::default()),
        "todos",
        &CacheConfig::default(),
    );
    let key = cache.keys().detail("1").unwrap();
    let payload = create_test_payload(100);

    // Pre-populate cache
    rt.block_on(async {
        let _ = cache
            .get_or_set(&key, move || async move { Ok::<_, Infallible>(payload) }, None)
            .await;
    });

    c.bench_function("get_or_set_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = cache
                .get_or_set(&key, || async { Ok::<_, Infallible>(serde_json::Value::Null) }, None)
                .await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: get_or_set (miss) con diferentes tamanos de payload
fn bench_get_or_set_miss_sizes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("get_or_set_miss_sizes");

    for size in [10, 100, 1000].iter() {
        let cache = Arc::new(CacheOrchestrator::new(
            Arc::new(MokaStore::default()),
            "todos",
            &CacheConfig::default(),
        ));
        let payload = Arc::new(create_test_payload(*size));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _size| {
            let counter = Arc::new(std::sync::atomic::AtomicU64::new(0));
            b.to_async(&rt).iter(|| {
                let cache = Arc::clone(&cache);
                let payload = Arc::clone(&payload);
                let counter = Arc::clone(&counter);
                async move {
                    let count = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    let key = cache.keys().detail(&count.to_string()).unwrap();
                    let _ = cache
                        .get_or_set(&key, || async { Ok::<_, Infallible>((*payload).clone()) }, None)
                        .await;
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: invalidacion de detail + patrones de lista
fn bench_invalidate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = Arc::new(CacheOrchestrator::new(
        Arc::new(MokaStore::default()),
        "todos",
        &CacheConfig::default(),
    ));
    let actions = vec!["stats".to_string(), "summary".to_string()];

    c.bench_function("invalidate_entity", |b| {
        b.to_async(&rt).iter(|| {
            let cache = Arc::clone(&cache);
            let actions = actions.clone();
            async move { std::hint::black_box(cache.invalidate(Some("1"), &actions).await) }
        });
    });
}

/// Benchmark: evaluacion de la ventana deslizante con historial lleno
fn bench_window_evaluate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let tracker = RateWindowTracker::new(Arc::new(MokaStore::default()), Arc::new(SystemClock));
    let scope = RateScope::new("anon", 1000, 86_400);

    // Llena la ventana para medir el camino de rechazo
    rt.block_on(async {
        for _ in 0..1000 {
            let _ = tracker.record_and_evaluate("throttle_anon_bench", &scope).await;
        }
    });

    c.bench_function("window_evaluate_full_1000", |b| {
        b.to_async(&rt).iter(|| async {
            let decision = tracker.record_and_evaluate("throttle_anon_bench", &scope).await;
            std::hint::black_box(decision)
        });
    });
}

criterion_group!(
    benches,
    bench_list_key,
    bench_get_or_set_hit,
    bench_get_or_set_miss_sizes,
    bench_invalidate,
    bench_window_evaluate,
);

criterion_main!(benches);
