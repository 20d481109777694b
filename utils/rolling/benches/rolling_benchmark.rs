use criterion::{Criterion, criterion_group, criterion_main};
use loka_rolling::{ManualClock, RollingConfig, RollingEvent, RollingNumber};
use std::hint::black_box;
use std::sync::Arc;

fn manual_counter() -> (RollingNumber<RollingEvent, Arc<ManualClock>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let counter = RollingNumber::with_clock(RollingConfig::default(), Arc::clone(&clock))
        .expect("Failed to create rolling counter");

    (counter, clock)
}

fn benchmark_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording");
    let (counter, _clock) = manual_counter();

    group.bench_function("increment", |b| {
        b.iter(|| {
            counter.increment(black_box(RollingEvent::Success));
        });
    });

    group.bench_function("add", |b| {
        b.iter(|| {
            counter.add(black_box(RollingEvent::ThreadExecution), black_box(5));
        });
    });

    group.bench_function("update_max", |b| {
        b.iter(|| {
            counter.update_max(black_box(RollingEvent::ThreadMaxActive), black_box(42));
        });
    });

    group.finish();
}

fn benchmark_rolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling");

    group.bench_function("increment_each_bucket", |b| {
        let (counter, clock) = manual_counter();
        let step = counter.bucket_size_ms() as i64;

        b.iter(|| {
            clock.advance(step);
            counter.increment(black_box(RollingEvent::Success));
        });
    });

    group.bench_function("increment_after_idle_window", |b| {
        let (counter, clock) = manual_counter();
        let step = counter.window_ms() as i64;

        b.iter(|| {
            clock.advance(step);
            counter.increment(black_box(RollingEvent::Success));
        });
    });

    group.finish();
}

fn benchmark_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");

    // Setup: fill every bucket in the window
    let (counter, clock) = manual_counter();
    for i in 0..counter.bucket_count() as u64 {
        counter.add(RollingEvent::Success, i + 1);
        counter.update_max(RollingEvent::ThreadMaxActive, i * 3);
        clock.advance(counter.bucket_size_ms() as i64 - 1);
    }

    group.bench_function("rolling_sum", |b| {
        b.iter(|| {
            black_box(counter.rolling_sum(black_box(RollingEvent::Success)));
        });
    });

    group.bench_function("rolling_max", |b| {
        b.iter(|| {
            black_box(counter.rolling_max(black_box(RollingEvent::ThreadMaxActive)));
        });
    });

    group.bench_function("values_per_bucket", |b| {
        b.iter(|| {
            black_box(counter.values_per_bucket(black_box(RollingEvent::Success)));
        });
    });

    group.bench_function("cumulative_sum", |b| {
        b.iter(|| {
            black_box(counter.cumulative_sum(black_box(RollingEvent::Success)));
        });
    });

    group.finish();
}

fn benchmark_concurrent_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_operations");

    group.bench_function("concurrent_increment", |b| {
        use std::thread;

        let counter = Arc::new(
            RollingNumber::<RollingEvent>::new(RollingConfig::default())
                .expect("Failed to create rolling counter"),
        );

        b.iter(|| {
            let num_threads = 4;
            let operations_per_thread = 1000;
            let mut handles = vec![];

            for thread_id in 0..num_threads {
                let counter = Arc::clone(&counter);
                let handle = thread::spawn(move || {
                    for i in 0..operations_per_thread {
                        if (thread_id + i) % 10 == 0 {
                            counter.update_max(RollingEvent::ThreadMaxActive, i as u64);
                        } else {
                            counter.increment(RollingEvent::Success);
                        }
                    }
                });
                handles.push(handle);
            }

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_recording,
    benchmark_rolling,
    benchmark_reads,
    benchmark_concurrent_operations
);
criterion_main!(benches);
