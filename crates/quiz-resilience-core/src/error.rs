//! The error taxonomy of a guarded remote call.
//!
//! A call through the guard pipeline can fail for exactly three reasons: the
//! rate limiter refused admission, the circuit breaker refused to call, or the
//! call itself failed in transport. Each guard crate converts its own error
//! into [`ResilienceError`] so a caller only ever matches on one type.
//!
//! ```
//! use quiz_resilience_core::ResilienceError;
//!
//! let err: ResilienceError<std::io::Error> = ResilienceError::CircuitOpen {
//!     name: Some("question-service".to_string()),
//! };
//! assert!(err.is_circuit_open());
//! assert_eq!(err.guard(), "circuit_breaker");
//! ```

use std::fmt;

/// Why a guarded call produced no value.
#[derive(Debug, Clone)]
pub enum ResilienceError<E> {
    /// The rate limiter had no permit available.
    RateLimited {
        /// Rate limiter name, if known.
        name: Option<String>,
    },

    /// The circuit breaker refused to call the dependency.
    CircuitOpen {
        /// Circuit breaker name, if known.
        name: Option<String>,
    },

    /// The call reached the dependency and failed.
    Transport(E),
}

impl<E> fmt::Display for ResilienceError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResilienceError::RateLimited { name } => match name {
                Some(n) => write!(f, "rate limiter '{}' rejected the call", n),
                None => write!(f, "rate limiter rejected the call"),
            },
            ResilienceError::CircuitOpen { name } => match name {
                Some(n) => write!(f, "circuit breaker '{}' is open", n),
                None => write!(f, "circuit breaker is open"),
            },
            ResilienceError::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl<E> std::error::Error for ResilienceError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResilienceError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> ResilienceError<E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ResilienceError::RateLimited { .. })
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ResilienceError::Transport(_))
    }

    /// Label of the guard that stopped the call, as used in fallback events
    /// and metric labels.
    pub fn guard(&self) -> &'static str {
        match self {
            ResilienceError::RateLimited { .. } => "rate_limiter",
            ResilienceError::CircuitOpen { .. } => "circuit_breaker",
            ResilienceError::Transport(_) => "transport",
        }
    }

    /// Returns the transport error, if the call got that far.
    pub fn into_transport(self) -> Option<E> {
        match self {
            ResilienceError::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Fills in the guard name on rejections that were converted without one.
    pub fn with_name(self, guard_name: &str) -> Self {
        match self {
            ResilienceError::RateLimited { name: None } => ResilienceError::RateLimited {
                name: Some(guard_name.to_string()),
            },
            ResilienceError::CircuitOpen { name: None } => ResilienceError::CircuitOpen {
                name: Some(guard_name.to_string()),
            },
            other => other,
        }
    }
}
