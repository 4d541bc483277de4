use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge, histogram};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Phase of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum CircuitState {
    /// Calls pass through.
    Closed = 0,
    /// Calls are rejected without reaching the dependency.
    Open = 1,
    /// A limited number of trial calls are admitted.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }
}

/// Point-in-time view of a circuit breaker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CircuitMetrics {
    pub state: CircuitState,
    /// Outcomes currently in the sliding window.
    pub total_calls: usize,
    pub failure_count: usize,
    pub success_count: usize,
    /// Failure ratio of the window (0.0 to 1.0).
    pub failure_rate: f64,
    /// Trial calls admitted since entering HalfOpen.
    pub half_open_calls: usize,
    pub time_since_state_change: Duration,
}

/// Proof of admission handed out by [`Circuit::try_acquire`].
///
/// Carries the transition generation it was issued in, so an outcome that
/// completes after the breaker has moved on can be told apart from one that
/// belongs to the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallPermit {
    generation: u64,
    state: CircuitState,
}

impl CallPermit {
    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    last_state_change: Instant,
    generation: u64,
    // true = failure, most recent at the back
    outcomes: VecDeque<bool>,
    failure_count: usize,
    half_open_admitted: usize,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        state_atomic.store(CircuitState::Closed as u8, Ordering::Release);
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: Instant::now(),
            generation: 0,
            outcomes: VecDeque::new(),
            failure_count: 0,
            half_open_admitted: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    /// Moves Open to HalfOpen once the cool-down has elapsed. Returns the
    /// resulting phase.
    pub(crate) fn refresh(&mut self, config: &CircuitBreakerConfig) -> CircuitState {
        if self.state == CircuitState::Open
            && self.last_state_change.elapsed() >= config.wait_duration_in_open
        {
            self.transition_to(CircuitState::HalfOpen, config);
        }
        self.state
    }

    pub(crate) fn metrics(&self) -> CircuitMetrics {
        let total_calls = self.outcomes.len();
        let failure_rate = if total_calls > 0 {
            self.failure_count as f64 / total_calls as f64
        } else {
            0.0
        };

        CircuitMetrics {
            state: self.state,
            total_calls,
            failure_count: self.failure_count,
            success_count: total_calls - self.failure_count,
            failure_rate,
            half_open_calls: self.half_open_admitted,
            time_since_state_change: self.last_state_change.elapsed(),
        }
    }

    /// Decides whether a call may go through, moving Open to HalfOpen once
    /// the cool-down has elapsed.
    pub(crate) fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> Option<CallPermit> {
        let permitted = match self.refresh(config) {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if self.half_open_admitted < config.permitted_calls_in_half_open {
                    self.half_open_admitted += 1;
                    true
                } else {
                    false
                }
            }
        };

        if permitted {
            config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallPermitted {
                    dependency: config.name.clone(),
                    timestamp: Instant::now(),
                    state: self.state,
                });
            Some(CallPermit {
                generation: self.generation,
                state: self.state,
            })
        } else {
            config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallRejected {
                    dependency: config.name.clone(),
                    timestamp: Instant::now(),
                    state: self.state,
                });

            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "rejected").increment(1);

            None
        }
    }

    pub(crate) fn record_success(
        &mut self,
        config: &CircuitBreakerConfig,
        permit: CallPermit,
        duration: Duration,
    ) {
        self.record(config, permit, false, duration);
    }

    pub(crate) fn record_failure(
        &mut self,
        config: &CircuitBreakerConfig,
        permit: CallPermit,
        duration: Duration,
    ) {
        self.record(config, permit, true, duration);
    }

    /// Gives back a permit whose call never completed, freeing its trial slot.
    pub(crate) fn release(&mut self, permit: CallPermit) {
        if permit.generation == self.generation
            && self.state == CircuitState::HalfOpen
            && self.half_open_admitted > 0
        {
            self.half_open_admitted -= 1;
        }
    }

    fn record(
        &mut self,
        config: &CircuitBreakerConfig,
        permit: CallPermit,
        is_failure: bool,
        duration: Duration,
    ) {
        let event = if is_failure {
            CircuitBreakerEvent::FailureRecorded {
                dependency: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
                duration,
            }
        } else {
            CircuitBreakerEvent::SuccessRecorded {
                dependency: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
                duration,
            }
        };
        config.event_listeners.emit(&event);

        #[cfg(feature = "metrics")]
        {
            let outcome = if is_failure { "failure" } else { "success" };
            counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => outcome).increment(1);
            histogram!("circuitbreaker_call_duration_seconds", "circuitbreaker" => config.name.clone())
                .record(duration.as_secs_f64());
        }

        // Outcomes admitted before the last transition only count towards a
        // fresh Closed window; they are never trial results.
        if permit.generation != self.generation {
            if self.state == CircuitState::Closed {
                self.push_outcome(config, is_failure);
                self.evaluate_window(config);
            }
            return;
        }

        match self.state {
            CircuitState::Closed => {
                self.push_outcome(config, is_failure);
                self.evaluate_window(config);
            }
            CircuitState::HalfOpen => {
                if is_failure {
                    self.transition_to(CircuitState::Open, config);
                } else {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            // Open never issues permits within its own generation.
            CircuitState::Open => {}
        }
    }

    fn push_outcome(&mut self, config: &CircuitBreakerConfig, is_failure: bool) {
        self.outcomes.push_back(is_failure);
        if is_failure {
            self.failure_count += 1;
        }
        while self.outcomes.len() > config.sliding_window_size {
            if let Some(true) = self.outcomes.pop_front() {
                self.failure_count -= 1;
            }
        }
    }

    fn evaluate_window(&mut self, config: &CircuitBreakerConfig) {
        let total = self.outcomes.len();
        if total < config.minimum_number_of_calls {
            return;
        }

        let failure_rate = self.failure_count as f64 / total as f64;
        if failure_rate >= config.failure_rate_threshold {
            self.transition_to(CircuitState::Open, config);
        }
    }

    pub(crate) fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Open, config);
    }

    pub(crate) fn force_closed(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Closed, config);
    }

    /// Back to Closed with an empty window, even if already Closed.
    pub(crate) fn reset(&mut self, config: &CircuitBreakerConfig) {
        if self.state == CircuitState::Closed {
            self.clear();
            self.generation += 1;
            self.last_state_change = Instant::now();
        } else {
            self.transition_to(CircuitState::Closed, config);
        }
    }

    fn clear(&mut self) {
        self.outcomes.clear();
        self.failure_count = 0;
        self.half_open_admitted = 0;
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                dependency: config.name.clone(),
                timestamp: Instant::now(),
                from_state,
                to_state: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %config.name,
            from = from_state.as_str(),
            to = state.as_str(),
            "circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => from_state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone())
                .set(state as u8 as f64);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.generation += 1;
        self.clear();
    }
}
