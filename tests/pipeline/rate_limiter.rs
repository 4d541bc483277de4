//! Rate limiter admission seen through the invoker.

use super::test_utils::{Behavior, ScriptedQuestionService};
use quiz_resilience_circuitbreaker::CircuitBreakerConfig;
use quiz_resilience_ratelimiter::{RateLimiter, RateLimiterConfig};
use quiz_service::ResilientInvoker;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

fn limiter(capacity: usize, period: Duration) -> RateLimiter {
    RateLimiterConfig::builder()
        .name("question-service")
        .limit_for_period(capacity)
        .refresh_period(period)
        .build()
}

#[tokio::test]
async fn call_over_capacity_falls_back() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let guards = Arc::new(Mutex::new(Vec::new()));
    let g = Arc::clone(&guards);
    let invoker = ResilientInvoker::builder(client.clone())
        .rate_limiter(limiter(5, Duration::from_secs(60)))
        .on_fallback(move |guard, _| g.lock().unwrap().push(guard))
        .build();

    for id in 0..5 {
        assert_eq!(invoker.invoke(id).await.len(), 1);
    }
    assert!(invoker.invoke(5).await.is_empty());

    assert_eq!(client.calls(), 5);
    assert_eq!(*guards.lock().unwrap(), vec!["rate_limiter"]);
}

#[tokio::test]
async fn permits_return_after_the_refresh_period() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let invoker = ResilientInvoker::builder(client.clone())
        .rate_limiter(limiter(2, Duration::from_millis(100)))
        .build();

    for _ in 0..3 {
        invoker.invoke(1).await;
    }
    assert_eq!(client.calls(), 2);

    sleep(Duration::from_millis(120)).await;

    for _ in 0..3 {
        invoker.invoke(1).await;
    }
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn rejections_do_not_count_against_the_breaker() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let breaker = CircuitBreakerConfig::builder()
        .sliding_window_size(2)
        .wait_duration_in_open(Duration::from_secs(60))
        .build();
    let invoker = ResilientInvoker::builder(client.clone())
        .rate_limiter(limiter(1, Duration::from_secs(60)))
        .circuit_breaker(breaker.clone())
        .build();

    for id in 0..10 {
        invoker.invoke(id).await;
    }

    assert!(!breaker.is_open());
    assert_eq!(breaker.metrics().total_calls, 1);
    assert_eq!(breaker.metrics().failure_count, 0);
}

#[tokio::test]
async fn endpoints_sharing_a_limiter_share_its_permits() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    let shared = limiter(3, Duration::from_secs(60));
    let get = ResilientInvoker::builder(client.clone())
        .rate_limiter(shared.clone())
        .build();
    let list = ResilientInvoker::builder(client.clone())
        .rate_limiter(shared.clone())
        .build();

    get.invoke(1).await;
    list.invoke(2).await;
    get.invoke(3).await;
    assert!(list.invoke(4).await.is_empty());
    assert_eq!(shared.available_permits(), 0);
    assert_eq!(client.calls(), 3);
}
