use std::time::{Duration, Instant};

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Admission {
    /// Whether a permit was taken.
    pub(crate) acquired: bool,
    /// Whether elapsed refresh periods refilled the bucket during this check.
    pub(crate) refreshed: bool,
    /// Permits left after the check.
    pub(crate) available_permits: usize,
}

/// Token bucket for one dependency.
///
/// Refill is lazy: every check first credits the whole refresh periods that
/// elapsed since the last refill, then tries to take a permit.
#[derive(Debug)]
pub(crate) struct RateLimiterState {
    /// Bucket capacity.
    limit_for_period: usize,
    refresh_period: Duration,
    available_permits: usize,
    /// Start of the current refresh period.
    last_refill: Instant,
}

impl RateLimiterState {
    pub(crate) fn new(limit_for_period: usize, refresh_period: Duration, now: Instant) -> Self {
        Self {
            limit_for_period,
            refresh_period,
            available_permits: limit_for_period,
            last_refill: now,
        }
    }

    /// Takes one permit if the bucket has any, refilling first.
    pub(crate) fn try_acquire(&mut self, now: Instant) -> Admission {
        let refreshed = self.refill(now);

        let acquired = if self.available_permits > 0 {
            self.available_permits -= 1;
            true
        } else {
            false
        };

        Admission {
            acquired,
            refreshed,
            available_permits: self.available_permits,
        }
    }

    /// Permits a check at `now` would see, without consuming or refilling.
    pub(crate) fn available_permits(&self, now: Instant) -> usize {
        if self.elapsed_periods(now) > 0 {
            self.limit_for_period
        } else {
            self.available_permits
        }
    }

    /// Credits whole elapsed periods. Returns whether any had elapsed.
    fn refill(&mut self, now: Instant) -> bool {
        let periods = self.elapsed_periods(now);
        if periods == 0 {
            return false;
        }

        self.available_permits = self.limit_for_period;

        // Keep the partial period so the refill clock stays on whole-period
        // boundaries.
        let remainder = if self.refresh_period.is_zero() {
            Duration::ZERO
        } else {
            let elapsed = now.saturating_duration_since(self.last_refill).as_nanos();
            let rem = elapsed % self.refresh_period.as_nanos();
            Duration::from_nanos(u64::try_from(rem).unwrap_or(u64::MAX))
        };
        self.last_refill = now.checked_sub(remainder).unwrap_or(now);
        true
    }

    fn elapsed_periods(&self, now: Instant) -> u128 {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if self.refresh_period.is_zero() {
            return u128::from(!elapsed.is_zero());
        }
        elapsed.as_nanos() / self.refresh_period.as_nanos()
    }
}
