use serde::{Deserialize, Serialize};

/// A stored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u64,
    pub question: String,
    pub quiz_id: u64,
}

/// Body of `POST /question` and `PUT /question/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub quiz_id: u64,
}
