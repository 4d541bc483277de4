//! HTTP surface of the quiz service.

use crate::model::{Quiz, QuizDraft, QuizId, QuizView};
use crate::state::AppState;
use crate::store::StoreError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use quiz_resilience_circuitbreaker::CircuitState;
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

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/quiz", get(list_quizzes).post(create_quiz))
        .route(
            "/quiz/:id",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
        .route("/health/ready", get(health_ready))
        .route("/health/live", get(health_live))
        .route("/admin/resilience", get(resilience_snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(draft): Json<QuizDraft>,
) -> (StatusCode, Json<Quiz>) {
    let quiz = state.store.create(draft);
    tracing::info!(quiz_id = quiz.id, "quiz created");
    (StatusCode::CREATED, Json(quiz))
}

async fn list_quizzes(State(state): State<AppState>) -> Json<Vec<QuizView>> {
    let quizzes = state.store.list();
    Json(state.list_quizzes.enrich_all(quizzes).await)
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<QuizId>,
) -> Result<Json<QuizView>, ApiError> {
    let quiz = state.store.get(id)?;
    Ok(Json(state.get_quiz.enrich(quiz).await))
}

async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<QuizId>,
    Json(draft): Json<QuizDraft>,
) -> Result<Json<Quiz>, ApiError> {
    Ok(Json(state.store.update(id, draft)?))
}

async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<QuizId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id)?;
    tracing::info!(quiz_id = id, "quiz deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 503 while the question service breaker is open, 200 otherwise.
async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let breaker = state.registry.find_circuit_breaker(&state.dependency);

    let (status, health, circuit_state) = match &breaker {
        Some(b) => (b.http_status(), b.health_status(), b.state()),
        None => (200, "healthy", CircuitState::Closed),
    };
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);

    (
        code,
        Json(serde_json::json!({
            "status": health,
            "dependency": state.dependency,
            "circuit_state": circuit_state.as_str(),
            "http_status": status,
        })),
    )
}

async fn health_live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

async fn resilience_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "dependencies": state.registry.snapshot() }))
}
