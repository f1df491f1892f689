/*!
 * Queue Benchmarks
 *
 * Bulk put/get throughput against VecDeque and a Vec used as a queue
 * (`remove(0)`), plus async wake-up latency per wake policy.
 */

use ai_os_fifo::{FifoQueue, QueueConfig, WakePolicy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

fn bench_bulk_put_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_put_get");

    for size in [1_000u64, 100_000] {
        group.throughput(Throughput::Elements(size));

        group.bench_with_input(BenchmarkId::new("fifo_queue", size), &size, |b, &size| {
            b.iter(|| {
                let queue = FifoQueue::new();
                for i in 0..size {
                    queue.put(black_box(i));
                }
                for _ in 0..size {
                    black_box(queue.get());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("vec_deque", size), &size, |b, &size| {
            b.iter(|| {
                let mut queue = VecDeque::new();
                for i in 0..size {
                    queue.push_back(black_box(i));
                }
                for _ in 0..size {
                    black_box(queue.pop_front());
                }
            })
        });
    }

    group.finish();
}

fn bench_vec_shift(c: &mut Criterion) {
    // Shifting is O(n) per get, so only the small size is tractable
    let size = 1_000u64;
    let mut group = c.benchmark_group("vec_shift");
    group.throughput(Throughput::Elements(size));

    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
        b.iter(|| {
            let mut queue = Vec::new();
            for i in 0..size {
                queue.push(black_box(i));
            }
            for _ in 0..size {
                black_box(queue.remove(0));
            }
        })
    });

    group.finish();
}

fn bench_steady_state(c: &mut Criterion) {
    let queue = FifoQueue::new();
    queue.extend(0..64u64);

    c.bench_function("steady_state/put_get", |b| {
        b.iter(|| {
            queue.put(black_box(1));
            black_box(queue.get())
        })
    });
}

fn bench_wake_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("wake_latency");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    for policy in [WakePolicy::Shared, WakePolicy::Fair] {
        let config = QueueConfig {
            wake_policy: policy,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(policy.as_str()),
            &config,
            |b, config| {
                b.to_async(&runtime).iter(|| async {
                    let queue = Arc::new(FifoQueue::with_config(config.clone()));
                    let consumer = {
                        let queue = queue.clone();
                        tokio::spawn(async move { queue.get_wait(Some(Duration::from_secs(1))).await })
                    };

                    queue.put(7u32);
                    black_box(consumer.await.unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_put_get,
    bench_vec_shift,
    bench_steady_state,
    bench_wake_latency
);
criterion_main!(benches);
