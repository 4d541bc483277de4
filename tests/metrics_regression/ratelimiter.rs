//! Rate limiter metrics regression tests

use super::helpers::*;
use quiz_resilience_ratelimiter::RateLimiterConfig;
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn ratelimiter_metrics_exist() {
    init_recorder();

    let limiter = RateLimiterConfig::builder()
        .name("test_ratelimiter")
        .limit_for_period(2)
        .refresh_period(Duration::from_secs(60))
        .build();

    for _ in 0..3 {
        let _ = limiter.try_acquire();
    }

    assert_counter_exists("ratelimiter_calls_total");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "test_ratelimiter");
    assert_metric_has_label("ratelimiter_calls_total", "result", "permitted");
    assert_metric_has_label("ratelimiter_calls_total", "result", "rejected");
}
