mod aggregator;
mod circuit_breaker;
mod rate_limiter;
mod test_utils;
