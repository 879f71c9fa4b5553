use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::content_dto::{
        CreateJourneyPayload, JourneyListQuery, ReorderStepsPayload, UpdateJourneyPayload,
    },
    error::{Error, Result},
    AppState,
};

#[axum::debug_handler]
pub async fn create_journey(
    State(state): State<AppState>,
    Json(payload): Json<CreateJourneyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let journey = state.journey_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(journey)))
}

#[axum::debug_handler]
pub async fn list_journeys(
    State(state): State<AppState>,
    Query(query): Query<JourneyListQuery>,
) -> Result<impl IntoResponse> {
    let journeys = state.journey_service.list(query.is_published).await?;
    Ok(Json(journeys))
}

/// Published journeys, as shown to players.
#[axum::debug_handler]
pub async fn list_published_journeys(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let journeys = state.journey_service.list(Some(true)).await?;
    Ok(Json(journeys))
}

#[axum::debug_handler]
pub async fn get_journey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let journey = state.journey_service.get(id).await?;
    Ok(Json(journey))
}

#[axum::debug_handler]
pub async fn update_journey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJourneyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let journey = state.journey_service.update(id, payload).await?;
    Ok(Json(journey))
}

#[utoipa::path(
    post,
    path = "/api/admin/journeys/{id}/reorder",
    params(
        ("id" = Uuid, Path, description = "Journey ID")
    ),
    responses(
        (status = 200, description = "Steps renumbered in the given order"),
        (status = 400, description = "step_ids is not a permutation of the steps")
    )
)]
#[axum::debug_handler]
pub async fn reorder_journey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderStepsPayload>,
) -> Result<impl IntoResponse> {
    let journey = state.journey_service.reorder_steps(id, &payload.step_ids).await?;
    Ok(Json(journey))
}

#[axum::debug_handler]
pub async fn delete_journey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.journey_service.delete(id).await? {
        return Err(Error::NotFound("Journey not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
