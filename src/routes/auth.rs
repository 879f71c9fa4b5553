use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::auth_dto::{OnboardingAnswersPayload, SessionResponse, SignInPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    models::onboarding_field::validate_answers,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session issued"),
        (status = 401, description = "Identity token rejected"),
        (status = 403, description = "Account not allowed")
    )
)]
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state.access_service.sign_in(&payload.id_token).await?;
    Ok(Json(SessionResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        first_login: outcome.first_login,
        profile: outcome.profile,
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let profile = state.user_service.get(claims.user_id()?).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/me/onboarding",
    responses(
        (status = 200, description = "Answers stored on the profile"),
        (status = 400, description = "Answers do not match the field definitions")
    )
)]
#[axum::debug_handler]
pub async fn submit_onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<OnboardingAnswersPayload>,
) -> Result<impl IntoResponse> {
    let fields = state.onboarding_service.list().await?;
    let answers = validate_answers(&fields, &payload.answers)
        .map_err(|errors| Error::BadRequest(errors.join("; ")))?;
    let profile = state
        .user_service
        .save_onboarding(claims.user_id()?, answers)
        .await?;
    tracing::info!(user_id = %profile.id, "onboarding completed");
    Ok(Json(profile))
}
