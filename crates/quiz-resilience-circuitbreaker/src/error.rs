use quiz_resilience_core::ResilienceError;
use thiserror::Error;

/// Errors returned by [`CircuitBreaker::call`](crate::CircuitBreaker::call).
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open (or half-open with no trial slot left); the
    /// dependency was not called.
    #[error("circuit is open; call not permitted")]
    OpenCircuit,

    /// The call went through and the dependency failed.
    #[error("inner service error: {0}")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::OpenCircuit)
    }

    /// Returns the dependency's error, if the call was made.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            CircuitBreakerError::OpenCircuit => None,
        }
    }
}

impl<E> From<E> for CircuitBreakerError<E> {
    fn from(err: E) -> Self {
        CircuitBreakerError::Inner(err)
    }
}

impl<E> From<CircuitBreakerError<E>> for ResilienceError<E> {
    fn from(err: CircuitBreakerError<E>) -> Self {
        match err {
            CircuitBreakerError::OpenCircuit => ResilienceError::CircuitOpen { name: None },
            CircuitBreakerError::Inner(e) => ResilienceError::Transport(e),
        }
    }
}
