//! HTTP surface of the question service.

use crate::model::{Question, QuestionDraft};
use crate::store::{QuestionStore, StoreError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// JSON body of error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub message: String,
    pub success: bool,
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        };
        let body = ApiResponse {
            message: self.to_string(),
            success: false,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(store: QuestionStore) -> Router {
    Router::new()
        .route("/question", get(list_questions).post(create_question))
        .route(
            "/question/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
        .route("/question/quiz/:quiz_id", get(questions_of_quiz))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn create_question(
    State(store): State<QuestionStore>,
    Json(draft): Json<QuestionDraft>,
) -> (StatusCode, Json<Question>) {
    let question = store.create(draft);
    tracing::info!(question_id = question.id, quiz_id = question.quiz_id, "question created");
    (StatusCode::CREATED, Json(question))
}

async fn list_questions(State(store): State<QuestionStore>) -> Json<Vec<Question>> {
    Json(store.list())
}

async fn get_question(
    State(store): State<QuestionStore>,
    Path(id): Path<u64>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(store.get(id)?))
}

async fn update_question(
    State(store): State<QuestionStore>,
    Path(id): Path<u64>,
    Json(draft): Json<QuestionDraft>,
) -> Result<Json<Question>, ApiError> {
    Ok(Json(store.update(id, draft)?))
}

async fn delete_question(
    State(store): State<QuestionStore>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn questions_of_quiz(
    State(store): State<QuestionStore>,
    Path(quiz_id): Path<u64>,
) -> Json<Vec<Question>> {
    Json(store.find_by_quiz(quiz_id))
}
