use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{AssignQuizRequest, DeletedResponse, UnassignQuizRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAssignmentsQuery {
    pub quiz_id: Option<Uuid>,
}

#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> crate::error::Result<Response> {
    let assignments = state.quiz_service.list_assignments(query.quiz_id).await?;
    Ok(Json(assignments).into_response())
}

#[axum::debug_handler]
pub async fn assign_quiz(
    State(state): State<AppState>,
    Json(req): Json<AssignQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let quiz_id = req.quiz_id;
    let assignments = state.quiz_service.assign(req).await?;
    tracing::info!(quiz_id = %quiz_id, count = assignments.len(), "quiz assigned");
    Ok((StatusCode::CREATED, Json(assignments)).into_response())
}

#[axum::debug_handler]
pub async fn unassign_quiz(
    State(state): State<AppState>,
    Json(req): Json<UnassignQuizRequest>,
) -> crate::error::Result<Response> {
    state
        .quiz_service
        .unassign(req.quiz_id, req.profile_id)
        .await?;
    tracing::info!(quiz_id = %req.quiz_id, profile_id = %req.profile_id, "quiz unassigned");
    Ok(Json(DeletedResponse { deleted: true }).into_response())
}
