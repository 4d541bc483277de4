use quiz_resilience_core::ResilienceError;
use thiserror::Error;

/// Errors returned by [`RateLimiter::try_acquire`](crate::RateLimiter::try_acquire).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimiterError {
    /// No permit was left in the current refresh period.
    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl<E> From<RateLimiterError> for ResilienceError<E> {
    fn from(_err: RateLimiterError) -> Self {
        ResilienceError::RateLimited { name: None }
    }
}
