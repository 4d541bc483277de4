//! Events emitted when the invoker substitutes the degraded result.

use crate::model::QuizId;
use quiz_resilience_core::ResilienceEvent;
use std::time::Instant;

/// Events emitted by [`ResilientInvoker`](crate::ResilientInvoker).
#[derive(Debug, Clone)]
pub enum FallbackEvent {
    /// An empty question list was returned instead of the remote result.
    Applied {
        dependency: String,
        timestamp: Instant,
        quiz_id: QuizId,
        /// `"rate_limiter"`, `"circuit_breaker"` or `"transport"`.
        guard: &'static str,
    },
}

impl FallbackEvent {
    pub fn guard(&self) -> &'static str {
        match self {
            FallbackEvent::Applied { guard, .. } => guard,
        }
    }

    pub fn quiz_id(&self) -> QuizId {
        match self {
            FallbackEvent::Applied { quiz_id, .. } => *quiz_id,
        }
    }
}

impl ResilienceEvent for FallbackEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FallbackEvent::Applied { .. } => "fallback_applied",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FallbackEvent::Applied { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            FallbackEvent::Applied { dependency, .. } => dependency,
        }
    }
}
