use crate::events::RateLimiterEvent;
use crate::RateLimiter;
use quiz_resilience_core::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for one rate limiter.
pub struct RateLimiterConfig {
    pub(crate) limit_for_period: usize,
    pub(crate) refresh_period: Duration,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit_for_period(&self) -> usize {
        self.limit_for_period
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }
}

/// Builder for a [`RateLimiter`].
pub struct RateLimiterConfigBuilder {
    limit_for_period: usize,
    refresh_period: Duration,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - limit_for_period: 50
    /// - refresh_period: 1 second
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            limit_for_period: 50,
            refresh_period: Duration::from_secs(1),
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the bucket capacity, i.e. the permits available per refresh period.
    pub fn limit_for_period(mut self, limit: usize) -> Self {
        self.limit_for_period = limit;
        self
    }

    /// Sets the refill interval.
    ///
    /// Each whole period that has elapsed tops the bucket back up to
    /// `limit_for_period`.
    pub fn refresh_period(mut self, duration: Duration) -> Self {
        self.refresh_period = duration;
        self
    }

    /// Names the dependency this limiter protects (used in events and logs).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for handed-out permits, called with the permits
    /// left in the bucket.
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitAcquired {
                available_permits, ..
            } = event
            {
                f(*available_permits);
            }
        }));
        self
    }

    /// Registers a callback for rejected calls.
    ///
    /// # Example
    /// ```rust
    /// use quiz_resilience_ratelimiter::RateLimiterConfig;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let rejections = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&rejections);
    ///
    /// let limiter = RateLimiterConfig::builder()
    ///     .limit_for_period(1)
    ///     .on_permit_rejected(move || {
    ///         counter.fetch_add(1, Ordering::SeqCst);
    ///     })
    ///     .build();
    ///
    /// assert!(limiter.try_acquire().is_ok());
    /// assert!(limiter.try_acquire().is_err());
    /// assert_eq!(rejections.load(Ordering::SeqCst), 1);
    /// ```
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, RateLimiterEvent::PermitRejected { .. }) {
                f();
            }
        }));
        self
    }

    /// Registers a callback for refills, called with the permits now in the
    /// bucket.
    pub fn on_permits_refreshed<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitsRefreshed {
                available_permits, ..
            } = event
            {
                f(*available_permits);
            }
        }));
        self
    }

    /// Registers a listener for every event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RateLimiterEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Builds the rate limiter.
    pub fn build(self) -> RateLimiter {
        let config = RateLimiterConfig {
            limit_for_period: self.limit_for_period,
            refresh_period: self.refresh_period,
            event_listeners: self.event_listeners,
            name: self.name,
        };

        RateLimiter::new(config)
    }
}
