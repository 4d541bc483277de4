//! Circuit breaker stress tests

use quiz_resilience_circuitbreaker::{CircuitBreakerConfig, CircuitState};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Test: 1 million calls through circuit breaker
#[tokio::test]
#[ignore]
async fn stress_one_million_calls() {
    let breaker = CircuitBreakerConfig::builder()
        .failure_rate_threshold(0.5)
        .sliding_window_size(100)
        .build();
    let calls = AtomicUsize::new(0);

    let start = Instant::now();
    for _ in 0..1_000_000 {
        let _ = breaker
            .call(|| async {
                calls.fetch_add(1, Ordering::Relaxed);
                Ok::<_, ()>(())
            })
            .await;
    }
    let elapsed = start.elapsed();

    println!("1M calls completed in {:?}", elapsed);
    println!(
        "Throughput: {:.0} calls/sec",
        1_000_000.0 / elapsed.as_secs_f64()
    );

    assert_eq!(calls.load(Ordering::Relaxed), 1_000_000);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.metrics().total_calls, 100);
}

/// Test: Rapid state transitions (thrashing)
#[tokio::test]
#[ignore]
async fn stress_rapid_state_transitions() {
    let transitions = Arc::new(AtomicUsize::new(0));
    let t = Arc::clone(&transitions);
    let breaker = CircuitBreakerConfig::builder()
        .failure_rate_threshold(0.5)
        .sliding_window_size(10)
        .wait_duration_in_open(Duration::from_millis(10))
        .on_state_transition(move |_, _| {
            t.fetch_add(1, Ordering::Relaxed);
        })
        .build();

    for round in 0..100 {
        for _ in 0..10 {
            let _ = breaker.call(|| async { Err::<(), _>(()) }).await;
        }
        assert_eq!(breaker.state(), CircuitState::Open, "round {}", round);

        tokio::time::sleep(Duration::from_millis(15)).await;
        let trial = breaker.call(|| async { Ok::<_, ()>(()) }).await;
        assert!(trial.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    // closed -> open -> half-open -> closed, per round
    assert_eq!(transitions.load(Ordering::Relaxed), 300);
}

/// Test: Concurrent failures from many tasks open the circuit exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_failures_single_transition() {
    let opened = Arc::new(AtomicUsize::new(0));
    let o = Arc::clone(&opened);
    let breaker = CircuitBreakerConfig::builder()
        .sliding_window_size(50)
        .wait_duration_in_open(Duration::from_secs(60))
        .on_state_transition(move |_, to| {
            if to == CircuitState::Open {
                o.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    let handles: Vec<_> = (0..5_000)
        .map(|_| {
            let breaker = breaker.clone();
            tokio::spawn(async move {
                breaker
                    .call(|| async {
                        tokio::task::yield_now().await;
                        Err::<(), _>(())
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.await;
    }

    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}
