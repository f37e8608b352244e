use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;

use permit_window::PermitPool;

fn new_pool() -> Arc<PermitPool> {
    Arc::new(PermitPool::new(
        NonZeroUsize::new(1_000).unwrap(),
        Duration::from_secs(1),
    ))
}

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("permit_pool");
    let pool = new_pool();

    // Dropping the permit returns it, so the pool never runs dry.
    group.bench_function("acquire-release", |b| {
        b.iter(|| {
            let _ = black_box(pool.as_ref()).try_acquire();
        })
    });

    group.bench_function("refill", |b| {
        b.iter(|| black_box(pool.as_ref()).refill())
    });

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("permit_pool_contended");

    for threads in [2, 4, 8].iter() {
        let num_threads = *threads;
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}-threads", num_threads)),
            &num_threads,
            |b, &n| {
                let pool = new_pool();
                b.iter_custom(|iters| {
                    let barrier = Arc::new(Barrier::new(n + 1));
                    let mut handles = Vec::with_capacity(n);

                    for _ in 0..n {
                        let p = Arc::clone(&pool);
                        let bar = Arc::clone(&barrier);
                        handles.push(thread::spawn(move || {
                            bar.wait();
                            for _ in 0..iters {
                                let _ = black_box(p.as_ref()).try_acquire();
                            }
                        }));
                    }

                    barrier.wait();
                    let start = Instant::now();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_single_thread, bench_parallel);
criterion_main!(benches);
