//! Circuit breaker metrics regression tests

use super::helpers::*;
use quiz_resilience_circuitbreaker::{CircuitBreakerConfig, CircuitState};
use serial_test::serial;
use std::time::Duration;

#[tokio::test]
#[serial]
async fn circuitbreaker_metrics_exist() {
    init_recorder();

    let breaker = CircuitBreakerConfig::builder()
        .name("test_cb")
        .failure_rate_threshold(0.5)
        .sliding_window_size(4)
        .minimum_number_of_calls(2)
        .wait_duration_in_open(Duration::from_secs(60))
        .build();

    // success, failure: 50% of two calls opens the circuit
    let _ = breaker.call(|| async { Ok::<_, &str>(()) }).await;
    let _ = breaker.call(|| async { Err::<(), _>("refused") }).await;
    assert_eq!(breaker.state(), CircuitState::Open);
    let _ = breaker.call(|| async { Ok::<_, &str>(()) }).await;

    assert_counter_exists("circuitbreaker_calls_total");
    assert_metric_has_label("circuitbreaker_calls_total", "circuitbreaker", "test_cb");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "success");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "failure");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "rejected");

    assert_counter_exists("circuitbreaker_transitions_total");
    assert_metric_has_label(
        "circuitbreaker_transitions_total",
        "circuitbreaker",
        "test_cb",
    );
    assert_metric_has_label("circuitbreaker_transitions_total", "from", "Closed");
    assert_metric_has_label("circuitbreaker_transitions_total", "to", "Open");

    assert_gauge_exists("circuitbreaker_state");
    assert_metric_has_label("circuitbreaker_state", "circuitbreaker", "test_cb");

    assert_histogram_exists("circuitbreaker_call_duration_seconds");
    assert_metric_has_label(
        "circuitbreaker_call_duration_seconds",
        "circuitbreaker",
        "test_cb",
    );
}

#[tokio::test]
#[serial]
async fn circuitbreaker_half_open_transition_metrics() {
    init_recorder();

    let breaker = CircuitBreakerConfig::builder()
        .name("recovering_cb")
        .sliding_window_size(2)
        .wait_duration_in_open(Duration::from_millis(20))
        .build();

    breaker.force_open();
    tokio::time::sleep(Duration::from_millis(40)).await;
    let _ = breaker.call(|| async { Ok::<_, &str>(()) }).await;
    assert_eq!(breaker.state(), CircuitState::Closed);

    assert_metric_has_label("circuitbreaker_transitions_total", "to", "HalfOpen");
    assert_metric_has_label("circuitbreaker_transitions_total", "from", "HalfOpen");
    assert_metric_has_label("circuitbreaker_state", "circuitbreaker", "recovering_cb");
}

#[tokio::test]
#[serial]
async fn circuitbreaker_state_gauge_exported_before_any_transition() {
    init_recorder();

    let breaker = CircuitBreakerConfig::builder().name("idle_cb").build();
    assert_eq!(breaker.state(), CircuitState::Closed);

    assert_gauge_exists("circuitbreaker_state");
    assert_metric_has_label("circuitbreaker_state", "circuitbreaker", "idle_cb");
}
