//! Property tests for the rate limiter.
//!
//! Invariants tested:
//! - Never admits more than capacity within one period
//! - Admits exactly capacity when asked at least that often

use proptest::prelude::*;
use quiz_resilience_ratelimiter::RateLimiterConfig;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn never_exceeds_capacity_within_a_period(
        capacity in 1usize..=50,
        requests in 1usize..=200,
    ) {
        let limiter = RateLimiterConfig::builder()
            .limit_for_period(capacity)
            .refresh_period(Duration::from_secs(60))
            .build();

        let admitted = (0..requests).filter(|_| limiter.try_acquire().is_ok()).count();

        prop_assert_eq!(admitted, requests.min(capacity));
        prop_assert_eq!(limiter.available_permits(), capacity - admitted);
    }
}
