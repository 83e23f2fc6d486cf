use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{ListAttemptsQuery, SubmitAttemptRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<ListAttemptsQuery>,
) -> crate::error::Result<Response> {
    let attempts = state.attempt_service.list(query).await?;
    Ok(Json(attempts).into_response())
}

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Json(req): Json<SubmitAttemptRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let attempt = state.attempt_service.submit(req).await?;
    tracing::info!(
        attempt_id = %attempt.id,
        quiz_id = %attempt.quiz_id,
        score = attempt.score,
        "attempt submitted"
    );
    Ok((StatusCode::CREATED, Json(attempt)).into_response())
}

#[axum::debug_handler]
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let attempt = state.attempt_service.get(id).await?;
    Ok(Json(attempt).into_response())
}

#[axum::debug_handler]
pub async fn list_user_attempts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> crate::error::Result<Response> {
    let attempts = state.attempt_service.list_for_user(&user_id).await?;
    Ok(Json(attempts).into_response())
}
