//! Rate limiter stress tests

use quiz_resilience_ratelimiter::RateLimiterConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Test: 1 million permits from a limiter that never runs dry
#[tokio::test]
#[ignore]
async fn stress_one_million_permits_no_throttling() {
    let limiter = RateLimiterConfig::builder()
        .limit_for_period(1_000_000)
        .refresh_period(Duration::from_secs(60))
        .build();

    let start = Instant::now();
    let granted = (0..1_000_000)
        .filter(|_| limiter.try_acquire().is_ok())
        .count();
    let elapsed = start.elapsed();

    println!("1M permits completed in {:?}", elapsed);
    assert_eq!(granted, 1_000_000);
    assert_eq!(limiter.available_permits(), 0);
}

/// Test: Many threads competing for a small bucket never over-admit
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_acquire_respects_capacity() {
    let limiter = RateLimiterConfig::builder()
        .limit_for_period(1_000)
        .refresh_period(Duration::from_secs(60))
        .build();
    let granted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..10_000)
        .map(|_| {
            let limiter = limiter.clone();
            let granted = Arc::clone(&granted);
            tokio::spawn(async move {
                if limiter.try_acquire().is_ok() {
                    granted.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.await;
    }

    assert_eq!(granted.load(Ordering::SeqCst), 1_000);
}
