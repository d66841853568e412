//! Benchmark suite for deferred values.
//!
//! Benchmarks the hot paths of the engine:
//! - Settle and fan out to N waiters
//! - Chains of handlers driven to completion
//! - Adoption chains collapsing onto their root
//! - all_of over mixed inputs
//! - Literal singleton lookups versus fresh allocations

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use asupersync_deferred::{Deferred, Error, Resolution, Runtime, RuntimeBuilder};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn runtime() -> Runtime {
    RuntimeBuilder::new().max_turns(0).build()
}

// =============================================================================
// SETTLEMENT BENCHMARKS
// =============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred/fan_out");

    for &count in &[1_u64, 10, 100, 1000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("settle_then_drain", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let rt = runtime();
                    let (value, resolver, _) = Deferred::<u64, Error>::pending(&rt);
                    let downstream: Vec<_> = (0..count).map(|_| value.map(|v| v + 1)).collect();
                    (rt, resolver, downstream)
                },
                |(rt, resolver, downstream)| {
                    resolver.fulfill(1);
                    black_box(rt.run_until_idle());
                    black_box(downstream)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_handler_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred/handler_chain");

    for &len in &[10_u64, 100, 1000] {
        group.throughput(Throughput::Elements(len));
        group.bench_with_input(BenchmarkId::new("map_chain", len), &len, |b, &len| {
            b.iter(|| {
                let rt = runtime();
                let mut current: Deferred<u64, Error> = rt.fulfilled(1);
                for _ in 0..len {
                    current = current.then(|v| Ok(Resolution::Value(v + 1)));
                }
                rt.run_until_idle();
                black_box(current.value())
            })
        });
    }

    group.finish();
}

// =============================================================================
// ADOPTION BENCHMARKS
// =============================================================================

fn bench_adoption_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred/adoption_chain");

    for &len in &[10_usize, 100, 1000] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("head_first", len), &len, |b, &len| {
            b.iter_batched(
                || {
                    let rt = runtime();
                    let chain: Vec<_> = (0..len)
                        .map(|_| Deferred::<u64, Error>::pending(&rt))
                        .collect();
                    (rt, chain)
                },
                |(_rt, chain)| {
                    for pair in chain.windows(2) {
                        pair[0].1.adopt(&pair[1].0);
                    }
                    chain[len - 1].1.fulfill(42);
                    black_box(chain[0].0.value())
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

// =============================================================================
// COMBINATOR BENCHMARKS
// =============================================================================

fn bench_all_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred/all_of");

    for &count in &[10_u64, 100, 1000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("mixed_inputs", count), &count, |b, &count| {
            b.iter(|| {
                let rt = runtime();
                let inputs: Vec<Resolution<u64, Error>> = (0..count)
                    .map(|i| {
                        if i % 2 == 0 {
                            Resolution::Value(i)
                        } else {
                            Resolution::Deferred(rt.fulfilled(i).map(|v| v * 2))
                        }
                    })
                    .collect();
                let all = rt.all_of(inputs);
                rt.run_until_idle();
                black_box(all.value())
            })
        });
    }

    group.finish();
}

fn bench_literals(c: &mut Criterion) {
    let mut group = c.benchmark_group("deferred/literals");

    group.bench_function("cached_true", |b| {
        let rt = runtime();
        b.iter(|| black_box(rt.fulfilled::<bool, Error>(black_box(true))))
    });

    group.bench_function("uncached_true", |b| {
        let rt = RuntimeBuilder::new().literal_cache(false).build();
        b.iter(|| black_box(rt.fulfilled::<bool, Error>(black_box(true))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fan_out,
    bench_handler_chain,
    bench_adoption_chain,
    bench_all_of,
    bench_literals
);
criterion_main!(benches);
