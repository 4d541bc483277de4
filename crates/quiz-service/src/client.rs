//! Remote access to the question service.

use crate::model::{Question, QuizId};
use futures::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

/// Why a remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportErrorKind {
    /// No response within the client timeout.
    #[error("timed out")]
    Timeout,
    /// The connection could not be established.
    #[error("connection refused")]
    Refused,
    /// The service answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// The body could not be decoded as a question list.
    #[error("malformed response")]
    MalformedResponse,
}

/// A failed call to the question service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("question service call for quiz {quiz_id} failed: {kind}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub quiz_id: QuizId,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, quiz_id: QuizId) -> Self {
        Self { kind, quiz_id }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    fn from_reqwest(err: &reqwest::Error, quiz_id: QuizId) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if let Some(status) = err.status() {
            TransportErrorKind::Status(status.as_u16())
        } else if err.is_decode() || err.is_body() {
            TransportErrorKind::MalformedResponse
        } else {
            TransportErrorKind::Refused
        };
        Self::new(kind, quiz_id)
    }
}

/// Fetches the questions that belong to a quiz.
///
/// One call is one network request; implementations do not retry.
pub trait QuestionClient: Send + Sync {
    fn fetch_questions(
        &self,
        quiz_id: QuizId,
    ) -> BoxFuture<'_, Result<Vec<Question>, TransportError>>;
}

/// [`QuestionClient`] speaking HTTP to `GET {base_url}/question/quiz/{quizId}`.
#[derive(Debug, Clone)]
pub struct HttpQuestionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQuestionClient {
    /// Builds a client whose every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, TransportError> {
        let url = format!("{}/question/quiz/{}", self.base_url, quiz_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, quiz_id))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                TransportErrorKind::Status(status.as_u16()),
                quiz_id,
            ));
        }

        response
            .json::<Vec<Question>>()
            .await
            .map_err(|e| match TransportError::from_reqwest(&e, quiz_id) {
                err if err.kind == TransportErrorKind::Timeout => err,
                _ => TransportError::new(TransportErrorKind::MalformedResponse, quiz_id),
            })
    }
}

impl QuestionClient for HttpQuestionClient {
    fn fetch_questions(
        &self,
        quiz_id: QuizId,
    ) -> BoxFuture<'_, Result<Vec<Question>, TransportError>> {
        Box::pin(self.get_questions(quiz_id))
    }
}
