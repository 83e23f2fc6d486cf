use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateQuestionRequest, DeletedResponse, UpdateQuestionRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(packet_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let questions = state.question_service.list_for_packet(packet_id).await?;
    Ok(Json(questions).into_response())
}

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Path(packet_id): Path<Uuid>,
    Json(req): Json<CreateQuestionRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let question = state.question_service.create(packet_id, req).await?;
    tracing::info!(question_id = %question.id, packet_id = %packet_id, "question created");
    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let question = state.question_service.get(id).await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let question = state.question_service.update(id, req).await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.question_service.delete(id).await?;
    tracing::info!(question_id = %id, "question deleted");
    Ok(Json(DeletedResponse { deleted: true }).into_response())
}
