//! Invariants checked over generated inputs.

pub mod rate_limiter;
