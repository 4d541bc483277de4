use quiz_resilience_core::ResilienceEvent;
use std::time::Instant;

/// Events emitted by the rate limiter.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A permit was handed out.
    PermitAcquired {
        dependency: String,
        timestamp: Instant,
        available_permits: usize,
    },
    /// A call was refused because the bucket was empty.
    PermitRejected {
        dependency: String,
        timestamp: Instant,
    },
    /// Elapsed refresh periods topped the bucket back up.
    PermitsRefreshed {
        dependency: String,
        timestamp: Instant,
        available_permits: usize,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "permit_acquired",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
            RateLimiterEvent::PermitsRefreshed { .. } => "permits_refreshed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. } => *timestamp,
            RateLimiterEvent::PermitRejected { timestamp, .. } => *timestamp,
            RateLimiterEvent::PermitsRefreshed { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { dependency, .. } => dependency,
            RateLimiterEvent::PermitRejected { dependency, .. } => dependency,
            RateLimiterEvent::PermitsRefreshed { dependency, .. } => dependency,
        }
    }
}
