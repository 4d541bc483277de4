//! Guarded remote call with a degraded fallback.
//!
//! [`ResilientInvoker::invoke`] runs one `fetch_questions` through the guards
//! configured for an endpoint:
//!
//! ```text
//! rate limiter ─▶ circuit breaker ─▶ question client
//!       │                │                  │
//!       └── rejected ────┴── open ──────────┴── transport error ──▶ fallback (empty list)
//! ```
//!
//! Either guard may be left out. The fallback never does I/O, so an
//! invocation takes at most the call timeout.

use crate::client::{QuestionClient, TransportError, TransportErrorKind};
use crate::fallback::FallbackEvent;
use crate::model::{Question, QuizId};
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
use quiz_resilience_circuitbreaker::CircuitBreaker;
use quiz_resilience_core::{EventListeners, FnListener, ResilienceError};
use quiz_resilience_ratelimiter::RateLimiter;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Error seen by the invoker before the fallback replaces it.
pub type InvokeError = ResilienceError<TransportError>;

/// Fetches questions for a quiz through the configured guards, falling back to
/// an empty list when any of them trips.
///
/// Cheap to clone; clones share guards and listeners.
#[derive(Clone)]
pub struct ResilientInvoker {
    dependency: Arc<str>,
    client: Arc<dyn QuestionClient>,
    rate_limiter: Option<RateLimiter>,
    circuit_breaker: Option<CircuitBreaker>,
    call_timeout: Duration,
    listeners: Arc<EventListeners<FallbackEvent>>,
}

impl ResilientInvoker {
    pub fn builder(client: Arc<dyn QuestionClient>) -> ResilientInvokerBuilder {
        ResilientInvokerBuilder::new(client)
    }

    /// Returns the remote questions, or an empty list if a guard rejected the
    /// call or the call failed. Never errors.
    pub async fn invoke(&self, quiz_id: QuizId) -> Vec<Question> {
        match self.try_invoke(quiz_id).await {
            Ok(questions) => questions,
            Err(err) => self.fallback(quiz_id, &err),
        }
    }

    /// Runs the guarded call without the fallback.
    pub async fn try_invoke(&self, quiz_id: QuizId) -> Result<Vec<Question>, InvokeError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter
                .try_acquire()
                .map_err(|e| InvokeError::from(e).with_name(limiter.name()))?;
        }

        match &self.circuit_breaker {
            Some(breaker) => breaker
                .call(|| self.fetch(quiz_id))
                .await
                .map_err(|e| InvokeError::from(e).with_name(breaker.name())),
            None => self.fetch(quiz_id).await.map_err(InvokeError::Transport),
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter.as_ref()
    }

    pub fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        self.circuit_breaker.as_ref()
    }

    async fn fetch(&self, quiz_id: QuizId) -> Result<Vec<Question>, TransportError> {
        match tokio::time::timeout(self.call_timeout, self.client.fetch_questions(quiz_id)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::new(TransportErrorKind::Timeout, quiz_id)),
        }
    }

    fn fallback(&self, quiz_id: QuizId, err: &InvokeError) -> Vec<Question> {
        let guard = err.guard();

        tracing::warn!(
            dependency = %self.dependency,
            quiz_id,
            guard,
            error = %err,
            "question fetch failed, returning no questions"
        );

        #[cfg(feature = "metrics")]
        counter!(
            "fallback_applied_total",
            "dependency" => self.dependency.to_string(),
            "guard" => guard
        )
        .increment(1);

        self.listeners.emit(&FallbackEvent::Applied {
            dependency: self.dependency.to_string(),
            timestamp: Instant::now(),
            quiz_id,
            guard,
        });

        Vec::new()
    }
}

impl std::fmt::Debug for ResilientInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientInvoker")
            .field("dependency", &self.dependency)
            .field("rate_limiter", &self.rate_limiter.is_some())
            .field("circuit_breaker", &self.circuit_breaker.is_some())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Builder for a [`ResilientInvoker`].
pub struct ResilientInvokerBuilder {
    dependency: String,
    client: Arc<dyn QuestionClient>,
    rate_limiter: Option<RateLimiter>,
    circuit_breaker: Option<CircuitBreaker>,
    call_timeout: Duration,
    listeners: EventListeners<FallbackEvent>,
}

impl ResilientInvokerBuilder {
    /// Defaults: dependency `question-service`, no guards, 5 second call
    /// timeout.
    pub fn new(client: Arc<dyn QuestionClient>) -> Self {
        Self {
            dependency: "question-service".to_string(),
            client,
            rate_limiter: None,
            circuit_breaker: None,
            call_timeout: Duration::from_secs(5),
            listeners: EventListeners::new(),
        }
    }

    /// Names the dependency in logs, metrics and events.
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependency = name.into();
        self
    }

    /// Admits calls through `limiter` first.
    pub fn rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Routes calls through `breaker`.
    pub fn circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.circuit_breaker = Some(breaker);
        self
    }

    /// Upper bound on one client call. A call still running when it expires
    /// counts as a [`TransportErrorKind::Timeout`].
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Registers a callback for applied fallbacks, called as
    /// `f(guard, quiz_id)`.
    pub fn on_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&'static str, QuizId) + Send + Sync + 'static,
    {
        self.listeners
            .add(FnListener::new(move |event: &FallbackEvent| {
                f(event.guard(), event.quiz_id());
            }));
        self
    }

    pub fn build(self) -> ResilientInvoker {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_applied_total",
                "Total number of question fetches answered by the empty fallback"
            );
        });

        ResilientInvoker {
            dependency: Arc::from(self.dependency),
            client: self.client,
            rate_limiter: self.rate_limiter,
            circuit_breaker: self.circuit_breaker,
            call_timeout: self.call_timeout,
            listeners: Arc::new(self.listeners),
        }
    }
}
