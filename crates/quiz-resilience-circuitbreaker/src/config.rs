use crate::events::CircuitBreakerEvent;
use crate::{CircuitBreaker, CircuitState};
use quiz_resilience_core::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for one circuit breaker.
pub struct CircuitBreakerConfig {
    pub(crate) name: String,
    pub(crate) failure_rate_threshold: f64,
    pub(crate) sliding_window_size: usize,
    pub(crate) minimum_number_of_calls: usize,
    pub(crate) wait_duration_in_open: Duration,
    pub(crate) permitted_calls_in_half_open: usize,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_rate_threshold(&self) -> f64 {
        self.failure_rate_threshold
    }

    pub fn sliding_window_size(&self) -> usize {
        self.sliding_window_size
    }

    pub fn wait_duration_in_open(&self) -> Duration {
        self.wait_duration_in_open
    }

    pub fn permitted_calls_in_half_open(&self) -> usize {
        self.permitted_calls_in_half_open
    }
}

/// Builder for a [`CircuitBreaker`].
pub struct CircuitBreakerConfigBuilder {
    name: String,
    failure_rate_threshold: f64,
    sliding_window_size: usize,
    minimum_number_of_calls: Option<usize>,
    wait_duration_in_open: Duration,
    permitted_calls_in_half_open: usize,
    event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            name: String::from("<unnamed>"),
            failure_rate_threshold: 0.5,
            sliding_window_size: 10,
            minimum_number_of_calls: None,
            wait_duration_in_open: Duration::from_secs(30),
            permitted_calls_in_half_open: 1,
            event_listeners: EventListeners::new(),
        }
    }

    /// Names the dependency this breaker protects.
    ///
    /// Default: `<unnamed>`
    pub fn name<N: Into<String>>(mut self, n: N) -> Self {
        self.name = n.into();
        self
    }

    /// Failure ratio at or above which the circuit opens.
    ///
    /// Default: 0.5 (50%)
    pub fn failure_rate_threshold(mut self, rate: f64) -> Self {
        self.failure_rate_threshold = rate;
        self
    }

    /// Number of most recent outcomes kept in the sliding window.
    ///
    /// Default: 10
    pub fn sliding_window_size(mut self, size: usize) -> Self {
        self.sliding_window_size = size;
        self
    }

    /// Outcomes required in the window before the failure ratio is evaluated.
    ///
    /// Default: the window size. Values above the window size are capped to it.
    pub fn minimum_number_of_calls(mut self, n: usize) -> Self {
        self.minimum_number_of_calls = Some(n);
        self
    }

    /// How long the circuit stays open before admitting trial calls.
    ///
    /// Default: 30 seconds
    pub fn wait_duration_in_open(mut self, duration: Duration) -> Self {
        self.wait_duration_in_open = duration;
        self
    }

    /// Number of trial calls admitted while half-open.
    ///
    /// Default: 1
    pub fn permitted_calls_in_half_open(mut self, n: usize) -> Self {
        self.permitted_calls_in_half_open = n;
        self
    }

    /// Registers a callback for phase changes, called as `f(from, to)`.
    ///
    /// ```rust
    /// use quiz_resilience_circuitbreaker::{CircuitBreakerConfig, CircuitState};
    ///
    /// let breaker = CircuitBreakerConfig::builder()
    ///     .name("question-service")
    ///     .on_state_transition(|from, to| {
    ///         if to == CircuitState::Open {
    ///             eprintln!("question-service degraded ({:?} -> {:?})", from, to);
    ///         }
    ///     })
    ///     .build();
    /// assert_eq!(breaker.state(), CircuitState::Closed);
    /// ```
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::StateTransition {
                    from_state,
                    to_state,
                    ..
                } = event
                {
                    f(*from_state, *to_state);
                }
            }));
        self
    }

    /// Registers a callback for admitted calls, called with the phase that
    /// admitted them (Closed or HalfOpen).
    pub fn on_call_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::CallPermitted { state, .. } = event {
                    f(*state);
                }
            }));
        self
    }

    /// Registers a callback for rejected calls.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if matches!(event, CircuitBreakerEvent::CallRejected { .. }) {
                    f();
                }
            }));
        self
    }

    /// Registers a callback for recorded successes.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::SuccessRecorded { state, .. } = event {
                    f(*state);
                }
            }));
        self
    }

    /// Registers a callback for recorded failures.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::FailureRecorded { state, .. } = event {
                    f(*state);
                }
            }));
        self
    }

    /// Registers a listener for every event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CircuitBreakerEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub(crate) fn into_config(self) -> CircuitBreakerConfig {
        let sliding_window_size = self.sliding_window_size.max(1);
        let minimum_number_of_calls = self
            .minimum_number_of_calls
            .unwrap_or(sliding_window_size)
            .clamp(1, sliding_window_size);

        CircuitBreakerConfig {
            name: self.name,
            failure_rate_threshold: self.failure_rate_threshold,
            sliding_window_size,
            minimum_number_of_calls,
            wait_duration_in_open: self.wait_duration_in_open,
            permitted_calls_in_half_open: self.permitted_calls_in_half_open.max(1),
            event_listeners: self.event_listeners,
        }
    }

    /// Builds the circuit breaker.
    pub fn build(self) -> CircuitBreaker {
        CircuitBreaker::new(self.into_config())
    }
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
