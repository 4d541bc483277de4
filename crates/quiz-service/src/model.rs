//! Records served and consumed by the quiz service.

use serde::{Deserialize, Serialize};

/// Identifier of a stored quiz.
pub type QuizId = u64;

/// A stored quiz. Questions are never stored here; see [`QuizView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
}

/// Body of `POST /quiz` and `PUT /quiz/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
}

/// A quiz together with the questions fetched for it during one request.
///
/// `questions` is either what the question service returned or empty when a
/// guard tripped or the call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizView {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl QuizView {
    pub fn new(quiz: Quiz, questions: Vec<Question>) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            questions,
        }
    }
}

/// Read-only copy of a question owned by the question service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u64,
    pub question: String,
    pub quiz_id: QuizId,
}
