//! Organizations, achievements, invitations and user roles.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::content_dto::{
        CreateAchievementPayload, CreateOrganizationPayload, CreateWhitelistPayload,
        UpdateRolePayload, UserListQuery, WhitelistQuery,
    },
    error::{Error, Result},
    AppState,
};

#[axum::debug_handler]
pub async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let organization = state.organization_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

#[axum::debug_handler]
pub async fn list_organizations(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.organization_service.list().await?))
}

#[axum::debug_handler]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.organization_service.delete(id).await? {
        return Err(Error::NotFound("Organization not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn create_achievement(
    State(state): State<AppState>,
    Json(payload): Json<CreateAchievementPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let achievement = state.achievement_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(achievement)))
}

#[axum::debug_handler]
pub async fn list_achievements(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.achievement_service.list().await?))
}

#[axum::debug_handler]
pub async fn delete_achievement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.achievement_service.delete(id).await? {
        return Err(Error::NotFound("Achievement not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/whitelist",
    responses(
        (status = 201, description = "Invitation stored"),
        (status = 409, description = "Email already invited")
    )
)]
#[axum::debug_handler]
pub async fn create_whitelist_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateWhitelistPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let entry = state.whitelist_service.create(payload).await?;
    tracing::info!(email = %entry.email, role = entry.role.as_str(), "invitation added");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[axum::debug_handler]
pub async fn list_whitelist(
    State(state): State<AppState>,
    Query(query): Query<WhitelistQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.whitelist_service.list(query.organization_id).await?))
}

#[axum::debug_handler]
pub async fn delete_whitelist_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.whitelist_service.delete(id).await? {
        return Err(Error::NotFound("Whitelist entry not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.user_service.list(query.role).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User profile ID")
    ),
    responses(
        (status = 200, description = "Role updated; takes effect on next sign-in"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse> {
    let profile = state
        .user_service
        .set_role(id, payload.role, payload.product_id)
        .await?;
    Ok(Json(profile))
}
