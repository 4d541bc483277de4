//! Stress tests for the guards and the invoker
//!
//! ## What We Test
//!
//! - **High volume**: a million guarded calls
//! - **High concurrency**: thousands of concurrent invocations
//! - **State consistency**: counters and windows stay exact under contention

pub mod circuitbreaker;
pub mod ratelimiter;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts operations in flight and remembers the highest count seen.
#[derive(Default)]
pub struct ConcurrencyTracker {
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl ConcurrencyTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
