//! Circuit breaker for calls to a named remote dependency.
//!
//! A circuit breaker stops calling a dependency that keeps failing and
//! periodically lets a few trial calls through to find out whether it has
//! recovered.
//!
//! ## States
//! - **Closed**: calls pass through; outcomes fill a sliding window of the last
//!   N calls. Once the failure ratio of a full window reaches the threshold the
//!   circuit opens.
//! - **Open**: calls are rejected with [`CircuitBreakerError::OpenCircuit`]
//!   without touching the dependency, until the cool-down has elapsed.
//! - **HalfOpen**: up to `permitted_calls_in_half_open` trial calls are
//!   admitted. One trial success closes the circuit, one trial failure opens
//!   it again and restarts the cool-down.
//!
//! ## Usage
//!
//! ```rust
//! use quiz_resilience_circuitbreaker::{CircuitBreakerConfig, CircuitBreakerError};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreakerConfig::builder()
//!     .name("question-service")
//!     .failure_rate_threshold(0.5)
//!     .sliding_window_size(10)
//!     .wait_duration_in_open(Duration::from_secs(5))
//!     .build();
//!
//! let result = breaker
//!     .call(|| async { Ok::<_, std::io::Error>(vec!["What is Rust?"]) })
//!     .await;
//!
//! match result {
//!     Ok(questions) => println!("{} questions", questions.len()),
//!     Err(CircuitBreakerError::OpenCircuit) => println!("question-service unavailable"),
//!     Err(CircuitBreakerError::Inner(e)) => println!("call failed: {}", e),
//! }
//! # }
//! ```
//!
//! Clones of a [`CircuitBreaker`] share one state, so a single breaker per
//! dependency can be handed to every request handler.
//!
//! ## Feature Flags
//! - `metrics`: call, transition and latency metrics via the `metrics` crate
//! - `tracing`: transition and rejection logging via the `tracing` crate
//! - `serde`: `Serialize` for [`CircuitState`] and [`CircuitMetrics`]

use crate::circuit::{CallPermit, Circuit};
#[cfg(feature = "metrics")]
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Instant;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;

mod circuit;
mod config;
mod error;
mod events;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A circuit breaker protecting one named dependency.
///
/// Admission and outcome recording each take the state lock once, together
/// with the transition check, so concurrent completions cannot lose or
/// duplicate a transition. The current phase is mirrored into an atomic for
/// lock-free reads.
pub struct CircuitBreaker {
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    config: Arc<CircuitBreakerConfig>,
}

impl CircuitBreaker {
    pub(crate) fn new(config: CircuitBreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "circuitbreaker_calls_total",
                "Total number of calls through the circuit breaker"
            );
            describe_counter!(
                "circuitbreaker_transitions_total",
                "Total number of circuit breaker state transitions"
            );
            describe_gauge!(
                "circuitbreaker_state",
                "Current state of the circuit breaker (0 closed, 1 open, 2 half-open)"
            );
            describe_histogram!(
                "circuitbreaker_call_duration_seconds",
                "Duration of calls through the circuit breaker"
            );
        });

        #[cfg(feature = "metrics")]
        gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone())
            .set(CircuitState::Closed as u8 as f64);

        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Arc::new(Mutex::new(Circuit::new(Arc::clone(&state_atomic)))),
            state_atomic,
            config: Arc::new(config),
        }
    }

    /// Runs `f` if the circuit admits the call and records its outcome.
    ///
    /// `Err` results count as failures. If the returned future is dropped
    /// before `f` completes, the admission is handed back without recording
    /// an outcome.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = match self.lock().try_acquire(&self.config) {
            Some(permit) => permit,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(breaker = %self.config.name, "circuit breaker rejected call");
                return Err(CircuitBreakerError::OpenCircuit);
            }
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            breaker = %self.config.name,
            state = permit.state().as_str(),
            "circuit breaker permitted call"
        );

        let mut pending = PendingCall {
            breaker: self,
            permit: Some(permit),
        };

        let start = Instant::now();
        let result = f().await;
        let duration = start.elapsed();

        if let Some(permit) = pending.permit.take() {
            let mut circuit = self.lock();
            if result.is_err() {
                circuit.record_failure(&self.config, permit, duration);
            } else {
                circuit.record_success(&self.config, permit, duration);
            }
        }

        result.map_err(CircuitBreakerError::Inner)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current phase.
    ///
    /// Closed and HalfOpen are read without taking the lock. An Open circuit
    /// whose cool-down has elapsed reports HalfOpen, the phase the next call
    /// will see. From inside an event listener the lock is already held, so
    /// the mirrored phase is returned as is.
    pub fn state(&self) -> CircuitState {
        let state = CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire));
        if state != CircuitState::Open {
            return state;
        }
        match self.circuit.try_lock() {
            Ok(mut circuit) => circuit.refresh(&self.config),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().refresh(&self.config),
            Err(TryLockError::WouldBlock) => state,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Returns a snapshot of the sliding window and phase.
    pub fn metrics(&self) -> CircuitMetrics {
        let mut circuit = self.lock();
        circuit.refresh(&self.config);
        circuit.metrics()
    }

    /// Forces the circuit open, starting a fresh cool-down.
    pub fn force_open(&self) {
        self.lock().force_open(&self.config);
    }

    /// Forces the circuit closed.
    pub fn force_closed(&self) {
        self.lock().force_closed(&self.config);
    }

    /// Closes the circuit and clears the sliding window.
    pub fn reset(&self) {
        self.lock().reset(&self.config);
    }

    /// `"healthy"` when closed, `"degraded"` when half-open, `"unhealthy"`
    /// when open.
    pub fn health_status(&self) -> &'static str {
        match self.state() {
            CircuitState::Closed => "healthy",
            CircuitState::HalfOpen => "degraded",
            CircuitState::Open => "unhealthy",
        }
    }

    /// 503 when open, 200 otherwise.
    pub fn http_status(&self) -> u16 {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => 200,
            CircuitState::Open => 503,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Circuit> {
        // Circuit updates cannot leave it half-written, so a poisoned lock is
        // still usable.
        self.circuit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            circuit: Arc::clone(&self.circuit),
            state_atomic: Arc::clone(&self.state_atomic),
            config: Arc::clone(&self.config),
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Hands an unused permit back if the call future is dropped mid-flight.
struct PendingCall<'a> {
    breaker: &'a CircuitBreaker,
    permit: Option<CallPermit>,
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            self.breaker.lock().release(permit);
        }
    }
}
