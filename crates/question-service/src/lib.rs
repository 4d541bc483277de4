//! Question service: CRUD over questions, plus lookup by quiz for the quiz
//! service.

pub mod http;
pub mod model;
pub mod store;

pub use http::{router, ApiError, ApiResponse};
pub use model::{Question, QuestionDraft};
pub use store::{QuestionStore, StoreError};

/// Number of questions inserted into an empty store at startup.
pub const SEED_QUESTIONS: usize = 10;
