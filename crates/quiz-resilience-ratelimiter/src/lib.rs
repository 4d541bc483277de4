//! Fail-fast rate limiter for calls to a named remote dependency.
//!
//! A token bucket holding `limit_for_period` permits. Each call takes one
//! permit or is refused immediately with
//! [`RateLimiterError::RateLimitExceeded`]; callers never queue. The bucket is
//! refilled lazily on each check: every whole `refresh_period` elapsed since
//! the last refill tops it back up to capacity.
//!
//! The limiter bounds call rate regardless of whether calls succeed, which is
//! what separates it from the circuit breaker.
//!
//! # Example
//!
//! ```rust
//! use quiz_resilience_ratelimiter::RateLimiterConfig;
//! use std::time::Duration;
//!
//! let limiter = RateLimiterConfig::builder()
//!     .name("question-service")
//!     .limit_for_period(2)
//!     .refresh_period(Duration::from_secs(1))
//!     .build();
//!
//! assert!(limiter.try_acquire().is_ok());
//! assert!(limiter.try_acquire().is_ok());
//! assert!(limiter.try_acquire().is_err());
//! ```
//!
//! Clones share one bucket.
//!
//! ## Feature Flags
//! - `metrics`: `ratelimiter_calls_total` counter labelled by result
//! - `tracing`: rejection and refill logging

use crate::limiter::RateLimiterState;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;

mod config;
mod error;
mod events;
mod limiter;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A token bucket shared by every caller of one dependency.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimiterState>>,
    config: Arc<RateLimiterConfig>,
}

impl RateLimiter {
    pub(crate) fn new(config: RateLimiterConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "ratelimiter_calls_total",
                "Total number of rate limiter admission checks (permitted or rejected)"
            );
        });

        let state = RateLimiterState::new(
            config.limit_for_period,
            config.refresh_period,
            Instant::now(),
        );
        Self {
            state: Arc::new(Mutex::new(state)),
            config: Arc::new(config),
        }
    }

    /// Takes one permit, or fails without waiting if the bucket is empty.
    pub fn try_acquire(&self) -> Result<(), RateLimiterError> {
        let now = Instant::now();
        let admission = self.lock().try_acquire(now);

        if admission.refreshed {
            #[cfg(feature = "tracing")]
            tracing::trace!(limiter = %self.config.name, "rate limiter permits refreshed");

            self.config
                .event_listeners
                .emit(&RateLimiterEvent::PermitsRefreshed {
                    dependency: self.config.name.clone(),
                    timestamp: now,
                    // Capacity, before this check took its permit.
                    available_permits: self.config.limit_for_period,
                });
        }

        if admission.acquired {
            self.config
                .event_listeners
                .emit(&RateLimiterEvent::PermitAcquired {
                    dependency: self.config.name.clone(),
                    timestamp: now,
                    available_permits: admission.available_permits,
                });

            #[cfg(feature = "metrics")]
            counter!("ratelimiter_calls_total", "ratelimiter" => self.config.name.clone(), "result" => "permitted")
                .increment(1);

            Ok(())
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(limiter = %self.config.name, "rate limiter rejected call");

            self.config
                .event_listeners
                .emit(&RateLimiterEvent::PermitRejected {
                    dependency: self.config.name.clone(),
                    timestamp: now,
                });

            #[cfg(feature = "metrics")]
            counter!("ratelimiter_calls_total", "ratelimiter" => self.config.name.clone(), "result" => "rejected")
                .increment(1);

            Err(RateLimiterError::RateLimitExceeded)
        }
    }

    /// Permits a call made now would find in the bucket.
    pub fn available_permits(&self) -> usize {
        self.lock().available_permits(Instant::now())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, RateLimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.config.name)
            .field("limit_for_period", &self.config.limit_for_period)
            .field("refresh_period", &self.config.refresh_period)
            .finish()
    }
}
