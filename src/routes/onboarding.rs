use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::content_dto::{CreateOnboardingFieldPayload, UpdateOnboardingFieldPayload},
    error::{Error, Result},
    AppState,
};

#[axum::debug_handler]
pub async fn create_field(
    State(state): State<AppState>,
    Json(payload): Json<CreateOnboardingFieldPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let field = state.onboarding_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

#[axum::debug_handler]
pub async fn list_fields(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let fields = state.onboarding_service.list().await?;
    Ok(Json(fields))
}

#[axum::debug_handler]
pub async fn get_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let field = state.onboarding_service.get(id).await?;
    Ok(Json(field))
}

#[axum::debug_handler]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOnboardingFieldPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let field = state.onboarding_service.update(id, payload).await?;
    Ok(Json(field))
}

#[axum::debug_handler]
pub async fn delete_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.onboarding_service.delete(id).await? {
        return Err(Error::NotFound("Onboarding field not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
