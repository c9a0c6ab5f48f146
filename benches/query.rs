//! Criterion benchmarks for the core-count query path.
//!
//! Run with:
//!   cargo bench --bench query
//!
//! Measures each platform probe on its own and the full
//! `charm.cmi.num_cores()` call through an in-process host.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use charm::config::{CoreSource, QueryConfig, NUM_CORES_PATH};
use charm::registry::InProcessHost;
use charm::topology::{CoreCountQuery, FixedCoreCount, HostTopology};

fn bench_probes(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe");

    for source in [CoreSource::Online, CoreSource::Available, CoreSource::Physical] {
        let host = HostTopology::new(QueryConfig::default().with_source(source));
        group.bench_with_input(BenchmarkId::from_parameter(source), &host, |b, host| {
            b.iter(|| host.query_core_count().unwrap())
        });
    }

    group.finish();
}

fn bench_binding_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("num_cores_call");

    // ── Fixed query isolates the binding overhead ────────────────────────────
    let (fixed, _) = InProcessHost::with_capabilities(Arc::new(FixedCoreCount(8)));
    group.bench_function("fixed", |b| {
        b.iter(|| fixed.call(NUM_CORES_PATH, &[]).unwrap())
    });

    // ── Host query ───────────────────────────────────────────────────────────
    let (host, _) = InProcessHost::with_capabilities(Arc::new(HostTopology::default()));
    group.bench_function("host", |b| {
        b.iter(|| host.call(NUM_CORES_PATH, &[]).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_probes, bench_binding_call);
criterion_main!(benches);
