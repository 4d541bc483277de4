use crate::CircuitState;
use quiz_resilience_core::ResilienceEvent;
use std::time::{Duration, Instant};

/// Events emitted by a circuit breaker.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    /// A call was admitted to the dependency.
    CallPermitted {
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call was refused without calling the dependency.
    CallRejected {
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// The breaker moved between phases.
    StateTransition {
        dependency: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
    },
    /// A successful outcome was recorded.
    SuccessRecorded {
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
        duration: Duration,
    },
    /// A failed outcome was recorded.
    FailureRecorded {
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
        duration: Duration,
    },
}

impl ResilienceEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            CircuitBreakerEvent::CallPermitted { dependency, .. }
            | CircuitBreakerEvent::CallRejected { dependency, .. }
            | CircuitBreakerEvent::StateTransition { dependency, .. }
            | CircuitBreakerEvent::SuccessRecorded { dependency, .. }
            | CircuitBreakerEvent::FailureRecorded { dependency, .. } => dependency,
        }
    }
}
