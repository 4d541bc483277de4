//! Quiz service.
//!
//! Stores quizzes and, when they are read, attaches the questions held by the
//! question service. That remote call is the only part that can fail or
//! stall, so it goes through a [`ResilientInvoker`]:
//!
//! - an optional rate limiter bounds how often the question service is called
//! - an optional circuit breaker stops calling it while it keeps failing
//! - any rejection or failure is answered with an empty question list
//!
//! [`QuizAggregator`] runs one invocation per quiz and pairs each result with
//! the quiz it was fetched for.
//!
//! ## Feature Flags
//! - `metrics`: `fallback_applied_total` plus the guards' own metrics

pub mod aggregator;
pub mod client;
pub mod fallback;
pub mod http;
pub mod invoker;
pub mod model;
pub mod registry;
pub mod settings;
pub mod state;
pub mod store;

pub use aggregator::QuizAggregator;
pub use client::{HttpQuestionClient, QuestionClient, TransportError, TransportErrorKind};
pub use fallback::FallbackEvent;
pub use http::{router, ApiError, ApiResponse};
pub use invoker::{InvokeError, ResilientInvoker, ResilientInvokerBuilder};
pub use model::{Question, Quiz, QuizDraft, QuizId, QuizView};
pub use registry::ResilienceRegistry;
pub use settings::{Settings, SettingsError};
pub use state::AppState;
pub use store::{QuizStore, StoreError};

/// Number of quizzes inserted into an empty store at startup.
pub const SEED_QUIZZES: usize = 5;
