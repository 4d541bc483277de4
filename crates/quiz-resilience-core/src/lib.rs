//! Core infrastructure shared by the quiz resilience guards.
//!
//! - Event system for observability (`events`)
//! - The error taxonomy every guard converts into (`error`)

pub mod error;
pub mod events;

pub use error::ResilienceError;
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
