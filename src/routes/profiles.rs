use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateProfileRequest, DeletedResponse, UpdateProfileRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_profiles(State(state): State<AppState>) -> crate::error::Result<Response> {
    let profiles = state.profile_service.list().await?;
    Ok(Json(profiles).into_response())
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let profile = state.profile_service.get(id).await?;
    Ok(Json(profile).into_response())
}

#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let profile = state.profile_service.create(req).await?;
    tracing::info!(profile_id = %profile.id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let profile = state.profile_service.update(id, req).await?;
    Ok(Json(profile).into_response())
}

#[axum::debug_handler]
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.profile_service.delete(id).await?;
    tracing::info!(profile_id = %id, "profile deleted");
    Ok(Json(DeletedResponse { deleted: true }).into_response())
}
