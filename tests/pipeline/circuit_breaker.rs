//! Breaker phases observed from the outside: what reaches the client.

use super::test_utils::{Behavior, ScriptedQuestionService};
use quiz_resilience_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use quiz_service::{ResilientInvoker, TransportErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const COOL_DOWN: Duration = Duration::from_millis(100);

fn breaker(trials: usize) -> CircuitBreaker {
    CircuitBreakerConfig::builder()
        .name("question-service")
        .failure_rate_threshold(0.5)
        .sliding_window_size(4)
        .wait_duration_in_open(COOL_DOWN)
        .permitted_calls_in_half_open(trials)
        .build()
}

async fn trip(invoker: &ResilientInvoker, client: &ScriptedQuestionService) {
    client.set(Behavior::Fail(TransportErrorKind::Refused));
    for id in 0..4 {
        invoker.invoke(id).await;
    }
}

#[tokio::test]
async fn threshold_opens_and_client_calls_stay_flat() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = breaker(1);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .build();

    // Two successes then two failures: 50% over a full window.
    invoker.invoke(1).await;
    invoker.invoke(2).await;
    client.set(Behavior::Fail(TransportErrorKind::Status(503)));
    invoker.invoke(3).await;
    assert_eq!(breaker.state(), CircuitState::Closed);
    invoker.invoke(4).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    let calls = client.calls();
    client.set(Behavior::Healthy);
    for id in 0..20 {
        assert!(invoker.invoke(id).await.is_empty());
    }
    assert_eq!(client.calls(), calls);
}

#[tokio::test]
async fn below_threshold_stays_closed() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = breaker(1);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .build();

    for round in 0..10 {
        client.set(if round % 4 == 0 {
            Behavior::Fail(TransportErrorKind::Timeout)
        } else {
            Behavior::Healthy
        });
        invoker.invoke(round).await;
    }
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(client.calls(), 10);
}

#[tokio::test]
async fn half_open_admits_exactly_the_trial_budget() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = breaker(2);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .call_timeout(Duration::from_millis(200))
        .build();

    trip(&invoker, &client).await;
    assert_eq!(breaker.state(), CircuitState::Open);
    sleep(COOL_DOWN + Duration::from_millis(20)).await;

    let before = client.calls();
    client.set(Behavior::Hang);

    let handles: Vec<_> = (0..6)
        .map(|id| {
            let invoker = invoker.clone();
            tokio::spawn(async move { invoker.invoke(id).await })
        })
        .collect();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert_eq!(client.calls() - before, 2);
    assert_eq!(breaker.metrics().half_open_calls, 2);

    for handle in handles {
        assert!(handle.await.unwrap().is_empty());
    }
    // The hung trials timed out, which counts as failure.
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test]
async fn trial_success_closes() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = breaker(1);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .build();

    trip(&invoker, &client).await;
    sleep(COOL_DOWN + Duration::from_millis(20)).await;

    client.set(Behavior::Healthy);
    assert_eq!(invoker.invoke(9).await.len(), 1);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.metrics().total_calls, 0);

    let before = client.calls();
    for id in 0..5 {
        assert_eq!(invoker.invoke(id).await.len(), 1);
    }
    assert_eq!(client.calls() - before, 5);
}

#[tokio::test]
async fn trial_failure_reopens_and_restarts_cool_down() {
    let transitions = Arc::new(AtomicUsize::new(0));
    let t = Arc::clone(&transitions);
    let breaker = CircuitBreakerConfig::builder()
        .name("question-service")
        .sliding_window_size(4)
        .wait_duration_in_open(COOL_DOWN)
        .on_state_transition(move |_, _| {
            t.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .build();

    trip(&invoker, &client).await;
    sleep(COOL_DOWN + Duration::from_millis(20)).await;

    let before = client.calls();
    assert!(invoker.invoke(1).await.is_empty());
    assert_eq!(client.calls() - before, 1);
    assert_eq!(breaker.state(), CircuitState::Open);

    // Closed -> Open, Open -> HalfOpen, HalfOpen -> Open
    assert_eq!(transitions.load(Ordering::SeqCst), 3);

    // Fresh cool-down: nothing reaches the client until it elapses again.
    client.set(Behavior::Healthy);
    sleep(COOL_DOWN / 2).await;
    assert!(invoker.invoke(2).await.is_empty());
    assert_eq!(client.calls() - before, 1);

    sleep(COOL_DOWN).await;
    assert_eq!(invoker.invoke(3).await.len(), 1);
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn forced_states_override_the_window() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = breaker(1);
    let invoker = ResilientInvoker::builder(client.clone())
        .circuit_breaker(breaker.clone())
        .build();

    breaker.force_open();
    assert!(invoker.invoke(1).await.is_empty());
    assert_eq!(client.calls(), 0);

    breaker.force_closed();
    assert_eq!(invoker.invoke(1).await.len(), 1);
    assert_eq!(client.calls(), 1);
}
