use std::sync::Arc;

use loka_rolling::{ManualClock, RollingConfig, RollingEvent, RollingNumber};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config: RollingConfig = serde_json::from_str(r#"{ "window_ms": 1000, "bucket_count": 5 }"#)
        .expect("Failed to parse rolling config");

    let clock = Arc::new(ManualClock::new());
    let counter = Arc::new(
        RollingNumber::<RollingEvent, _>::with_clock(config, Arc::clone(&clock))
            .expect("Failed to create rolling counter"),
    );

    println!("=== Rolling Window Example ===\n");
    println!(
        "Window: {}ms, {} buckets of {}ms\n",
        counter.window_ms(),
        counter.bucket_count(),
        counter.bucket_size_ms()
    );

    // Simulate guarded calls over a few seconds
    println!("--- Traffic ---");
    simulate_traffic(&counter, &clock);

    println!("\n--- Metrics Facade ---");
    let rejected = counter
        .counter(RollingEvent::ThreadPoolRejected)
        .expect("ThreadPoolRejected is a counter kind");
    let active = counter
        .max_tracker(RollingEvent::CommandMaxActive)
        .expect("CommandMaxActive is a max-updater kind");

    rejected.increment(3);
    active.record(9.0);
    println!(
        "  rejected (rolling): {}",
        counter.rolling_sum(RollingEvent::ThreadPoolRejected)
    );
    println!(
        "  command max active (rolling): {}",
        counter.rolling_max(RollingEvent::CommandMaxActive)
    );

    println!("\n--- Idle Window ---");
    clock.advance(counter.window_ms() as i64);
    print_summary(&counter);

    println!("\n--- Reset ---");
    counter.reset();
    print_summary(&counter);
}

fn simulate_traffic(counter: &RollingNumber<RollingEvent, Arc<ManualClock>>, clock: &ManualClock) {
    // (successes, failures, timeouts, concurrent calls) per 100ms tick
    let ticks = [
        (12, 0, 0, 3),
        (15, 1, 0, 4),
        (9, 3, 2, 7),
        (0, 0, 0, 0),
        (0, 0, 0, 0),
        (20, 0, 1, 5),
        (18, 2, 0, 6),
        (11, 5, 4, 9),
        (14, 0, 0, 2),
        (16, 1, 0, 3),
        (13, 0, 0, 4),
        (17, 2, 1, 5),
    ];

    for (i, (successes, failures, timeouts, concurrent)) in ticks.iter().enumerate() {
        counter.add(RollingEvent::Success, *successes);
        counter.add(RollingEvent::Failure, *failures);
        counter.add(RollingEvent::Timeout, *timeouts);
        counter.update_max(RollingEvent::ThreadMaxActive, *concurrent);

        println!(
            "  t={:>4}ms success={:>3} failure={:>2} timeout={:>2} per-bucket={:?}",
            i * 100,
            counter.rolling_sum(RollingEvent::Success),
            counter.rolling_sum(RollingEvent::Failure),
            counter.rolling_sum(RollingEvent::Timeout),
            counter.values_per_bucket(RollingEvent::Success)
        );

        clock.advance(100);
    }

    print_summary(counter);
}

fn print_summary(counter: &RollingNumber<RollingEvent, Arc<ManualClock>>) {
    println!("  buckets: {}", counter.ring_len());
    println!(
        "  success rolling={} cumulative={}",
        counter.rolling_sum(RollingEvent::Success),
        counter.cumulative_sum(RollingEvent::Success)
    );
    println!(
        "  thread max active rolling={} all-time={}",
        counter.rolling_max(RollingEvent::ThreadMaxActive),
        counter.cumulative_max(RollingEvent::ThreadMaxActive)
    );
}
