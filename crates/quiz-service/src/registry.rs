//! Guards shared per remote dependency.

use quiz_resilience_circuitbreaker::{CircuitBreaker, CircuitMetrics, CircuitState};
use quiz_resilience_ratelimiter::RateLimiter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Holds the one circuit breaker and one rate limiter of each dependency.
///
/// Invokers for different endpoints that talk to the same dependency get
/// clones of the same guards from here, so they share state.
#[derive(Debug, Default)]
pub struct ResilienceRegistry {
    circuit_breakers: RwLock<BTreeMap<String, CircuitBreaker>>,
    rate_limiters: RwLock<BTreeMap<String, RateLimiter>>,
}

/// Admin view of one dependency's guards.
#[derive(Debug, Clone, Serialize)]
pub struct DependencySnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<BreakerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limiter: Option<LimiterSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub health: &'static str,
    pub metrics: CircuitMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimiterSnapshot {
    pub available_permits: usize,
    pub limit_for_period: usize,
    pub refresh_period_ms: u128,
}

impl ResilienceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the breaker registered under `name`, creating it with `build`
    /// on first use.
    pub fn circuit_breaker<F>(&self, name: &str, build: F) -> CircuitBreaker
    where
        F: FnOnce() -> CircuitBreaker,
    {
        if let Some(breaker) = self.find_circuit_breaker(name) {
            return breaker;
        }
        let mut breakers = self
            .circuit_breakers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        breakers.entry(name.to_string()).or_insert_with(build).clone()
    }

    /// Returns the limiter registered under `name`, creating it with `build`
    /// on first use.
    pub fn rate_limiter<F>(&self, name: &str, build: F) -> RateLimiter
    where
        F: FnOnce() -> RateLimiter,
    {
        if let Some(limiter) = self.find_rate_limiter(name) {
            return limiter;
        }
        let mut limiters = self
            .rate_limiters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        limiters.entry(name.to_string()).or_insert_with(build).clone()
    }

    pub fn find_circuit_breaker(&self, name: &str) -> Option<CircuitBreaker> {
        self.circuit_breakers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn find_rate_limiter(&self, name: &str) -> Option<RateLimiter> {
        self.rate_limiters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Snapshot of every registered dependency, ordered by name.
    pub fn snapshot(&self) -> Vec<DependencySnapshot> {
        let breakers = self
            .circuit_breakers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let limiters = self
            .rate_limiters
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut names: Vec<&String> = breakers.keys().chain(limiters.keys()).collect();
        names.sort();
        names.dedup();

        names
            .into_iter()
            .map(|name| DependencySnapshot {
                name: name.clone(),
                circuit_breaker: breakers.get(name).map(|b| BreakerSnapshot {
                    state: b.state(),
                    health: b.health_status(),
                    metrics: b.metrics(),
                }),
                rate_limiter: limiters.get(name).map(|l| LimiterSnapshot {
                    available_permits: l.available_permits(),
                    limit_for_period: l.config().limit_for_period(),
                    refresh_period_ms: l.config().refresh_period().as_millis(),
                }),
            })
            .collect()
    }
}
