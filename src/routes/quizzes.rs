use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    CreateQuizRequest, DeletedResponse, PutTemplateRequest, SetQuizPacketsRequest,
    UpdateQuizRequest,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_quizzes(State(state): State<AppState>) -> crate::error::Result<Response> {
    let quizzes = state.quiz_service.list().await?;
    Ok(Json(quizzes).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let quiz = state.quiz_service.get(id).await?;
    Ok(Json(quiz).into_response())
}

#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(req): Json<CreateQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let quiz = state.quiz_service.create(req).await?;
    tracing::info!(quiz_id = %quiz.id, "quiz created");
    Ok((StatusCode::CREATED, Json(quiz)).into_response())
}

#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let quiz = state.quiz_service.update(id, req).await?;
    Ok(Json(quiz).into_response())
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.quiz_service.delete(id).await?;
    tracing::info!(quiz_id = %id, "quiz deleted");
    Ok(Json(DeletedResponse { deleted: true }).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz_packets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let packets = state.quiz_service.packets_for_quiz(id).await?;
    Ok(Json(packets).into_response())
}

#[axum::debug_handler]
pub async fn set_quiz_packets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetQuizPacketsRequest>,
) -> crate::error::Result<Response> {
    let packets = state.quiz_service.set_packets(id, &req.packet_ids).await?;
    tracing::info!(quiz_id = %id, count = packets.len(), "quiz packets replaced");
    Ok(Json(packets).into_response())
}

#[axum::debug_handler]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let template = state.quiz_service.get_template(id).await?;
    Ok(Json(template).into_response())
}

#[axum::debug_handler]
pub async fn put_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PutTemplateRequest>,
) -> crate::error::Result<Response> {
    let template = state.quiz_service.put_template(id, req.template).await?;
    tracing::info!(quiz_id = %id, "report template saved");
    Ok(Json(template).into_response())
}

#[axum::debug_handler]
pub async fn quiz_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let summary = state.quiz_service.summary(id).await?;
    Ok(Json(summary).into_response())
}
