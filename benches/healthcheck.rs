//! 健康检查基准测试
//!
//! 测试状态归约和并发执行探针的开销

use criterion::{criterion_group, criterion_main, Criterion};
use service_healthcheck::health::reduce;
use service_healthcheck::{CheckContext, Healthcheck, Status};
use std::hint::black_box;

/// 状态归约基准测试
fn reduce_benchmark(c: &mut Criterion) {
    let statuses: Vec<Status> = (0..1000)
        .map(|i| if i % 97 == 0 { Status::Degraded } else { Status::Healthy })
        .collect();

    c.bench_function("reduce_1000_statuses", |b| {
        b.iter(|| black_box(reduce(statuses.iter().copied())))
    });
}

/// 并发执行探针基准测试
fn handle_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut builder = Healthcheck::builder();
    for i in 0..32 {
        builder = builder.probe_fn(format!("probe-{i}"), |_ctx| async { anyhow::Ok(()) });
    }
    let hc = builder.build().unwrap();

    c.bench_function("handle_32_instant_probes", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(hc.handle(&CheckContext::new()).await) })
    });
}

criterion_group!(benches, reduce_benchmark, handle_benchmark);
criterion_main!(benches);
