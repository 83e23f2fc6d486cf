use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreatePacketRequest, DeletedResponse, UpdatePacketRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_packets(State(state): State<AppState>) -> crate::error::Result<Response> {
    let packets = state.packet_service.list().await?;
    Ok(Json(packets).into_response())
}

#[axum::debug_handler]
pub async fn get_packet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let packet = state.packet_service.get(id).await?;
    Ok(Json(packet).into_response())
}

#[axum::debug_handler]
pub async fn create_packet(
    State(state): State<AppState>,
    Json(req): Json<CreatePacketRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let packet = state.packet_service.create(req).await?;
    tracing::info!(packet_id = %packet.id, "packet created");
    Ok((StatusCode::CREATED, Json(packet)).into_response())
}

#[axum::debug_handler]
pub async fn update_packet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePacketRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let packet = state.packet_service.update(id, req).await?;
    Ok(Json(packet).into_response())
}

#[axum::debug_handler]
pub async fn delete_packet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.packet_service.delete(id).await?;
    tracing::info!(packet_id = %id, "packet deleted");
    Ok(Json(DeletedResponse { deleted: true }).into_response())
}
