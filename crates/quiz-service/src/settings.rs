//! Quiz service settings, loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file) yields a working
//! configuration:
//!
//! ```toml
//! [question_service]
//! name = "question-service"
//! base_url = "http://127.0.0.1:8085"
//! timeout_ms = 2000
//!
//! [circuit_breaker]
//! failure_rate_threshold = 0.5
//! sliding_window_size = 10
//! wait_duration_in_open_ms = 30000
//! permitted_calls_in_half_open = 1
//!
//! [rate_limiter]
//! limit_for_period = 50
//! refresh_period_ms = 1000
//!
//! [endpoints.get_quiz]
//! rate_limiter = true
//! circuit_breaker = true
//!
//! [endpoints.list_quizzes]
//! rate_limiter = false
//! circuit_breaker = true
//! ```

use quiz_resilience_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
use quiz_resilience_ratelimiter::{RateLimiter, RateLimiterConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub question_service: QuestionServiceSettings,
    pub circuit_breaker: CircuitBreakerSettings,
    pub rate_limiter: RateLimiterSettings,
    pub endpoints: EndpointSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestionServiceSettings {
    /// Dependency name the guards are registered under.
    pub name: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for QuestionServiceSettings {
    fn default() -> Self {
        Self {
            name: "question-service".to_string(),
            base_url: "http://127.0.0.1:8085".to_string(),
            timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerSettings {
    pub failure_rate_threshold: f64,
    pub sliding_window_size: usize,
    /// Defaults to the window size.
    pub minimum_number_of_calls: Option<usize>,
    pub wait_duration_in_open_ms: u64,
    pub permitted_calls_in_half_open: usize,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            sliding_window_size: 10,
            minimum_number_of_calls: None,
            wait_duration_in_open_ms: 30_000,
            permitted_calls_in_half_open: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimiterSettings {
    pub limit_for_period: usize,
    pub refresh_period_ms: u64,
}

impl Default for RateLimiterSettings {
    fn default() -> Self {
        Self {
            limit_for_period: 50,
            refresh_period_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointSettings {
    pub get_quiz: GuardSwitches,
    pub list_quizzes: GuardSwitches,
}

impl EndpointSettings {
    /// Guards for `GET /quiz/{id}`; both on unless switched off.
    pub fn get_quiz(&self) -> Guards {
        self.get_quiz.resolve(Guards {
            rate_limiter: true,
            circuit_breaker: true,
        })
    }

    /// Guards for `GET /quiz`; circuit breaker only unless switched.
    pub fn list_quizzes(&self) -> Guards {
        self.list_quizzes.resolve(Guards {
            rate_limiter: false,
            circuit_breaker: true,
        })
    }
}

/// Per-endpoint overrides. Unset switches keep the endpoint's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardSwitches {
    pub rate_limiter: Option<bool>,
    pub circuit_breaker: Option<bool>,
}

impl GuardSwitches {
    fn resolve(self, defaults: Guards) -> Guards {
        Guards {
            rate_limiter: self.rate_limiter.unwrap_or(defaults.rate_limiter),
            circuit_breaker: self.circuit_breaker.unwrap_or(defaults.circuit_breaker),
        }
    }
}

/// Which guards an endpoint's remote call goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guards {
    pub rate_limiter: bool,
    pub circuit_breaker: bool,
}

impl Settings {
    /// Loads settings from `path`, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let cb = &self.circuit_breaker;
        if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 1.0) {
            return Err(invalid(format!(
                "circuit_breaker.failure_rate_threshold must be in (0, 1], got {}",
                cb.failure_rate_threshold
            )));
        }
        non_zero("circuit_breaker.sliding_window_size", cb.sliding_window_size as u64)?;
        if let Some(min) = cb.minimum_number_of_calls {
            non_zero("circuit_breaker.minimum_number_of_calls", min as u64)?;
        }
        non_zero(
            "circuit_breaker.wait_duration_in_open_ms",
            cb.wait_duration_in_open_ms,
        )?;
        non_zero(
            "circuit_breaker.permitted_calls_in_half_open",
            cb.permitted_calls_in_half_open as u64,
        )?;

        non_zero(
            "rate_limiter.limit_for_period",
            self.rate_limiter.limit_for_period as u64,
        )?;
        non_zero(
            "rate_limiter.refresh_period_ms",
            self.rate_limiter.refresh_period_ms,
        )?;

        let qs = &self.question_service;
        non_zero("question_service.timeout_ms", qs.timeout_ms)?;
        if qs.name.trim().is_empty() {
            return Err(invalid("question_service.name must not be empty".to_string()));
        }
        // The HTTP client is built without a TLS backend.
        if !qs.base_url.starts_with("http://") {
            return Err(invalid(format!(
                "question_service.base_url must be a plain http:// URL, got {:?}",
                qs.base_url
            )));
        }
        Ok(())
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.question_service.timeout_ms)
    }

    /// Builds the question service breaker described by these settings.
    pub fn build_circuit_breaker(&self) -> CircuitBreaker {
        let cb = &self.circuit_breaker;
        let name = self.question_service.name.clone();
        let mut builder = CircuitBreakerConfig::builder()
            .name(name.clone())
            .failure_rate_threshold(cb.failure_rate_threshold)
            .sliding_window_size(cb.sliding_window_size)
            .wait_duration_in_open(Duration::from_millis(cb.wait_duration_in_open_ms))
            .permitted_calls_in_half_open(cb.permitted_calls_in_half_open)
            .on_call_rejected(move || {
                tracing::debug!(dependency = %name, "question fetch short-circuited");
            });
        if let Some(min) = cb.minimum_number_of_calls {
            builder = builder.minimum_number_of_calls(min);
        }
        builder.build()
    }

    /// Builds the question service rate limiter described by these settings.
    pub fn build_rate_limiter(&self) -> RateLimiter {
        RateLimiterConfig::builder()
            .name(self.question_service.name.clone())
            .limit_for_period(self.rate_limiter.limit_for_period)
            .refresh_period(Duration::from_millis(self.rate_limiter.refresh_period_ms))
            .build()
    }
}

fn invalid(message: String) -> SettingsError {
    SettingsError::Invalid(message)
}

fn non_zero(field: &str, value: u64) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(invalid(format!("{field} must be greater than zero")));
    }
    Ok(())
}
