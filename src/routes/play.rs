use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    config::get_config,
    dto::content_dto::{paging, QuizListQuery},
    dto::play_dto::{ResultsQuery, ResultsResponse, SelectPayload},
    error::Result,
    middleware::auth::Claims,
    services::play_service::PlayAction,
    services::quiz_service::QuizFilter,
    utils::crypto,
    AppState,
};

/// Published quizzes a player can start.
#[axum::debug_handler]
pub async fn list_playable_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    let (page, per_page) = paging(query.page, query.per_page);
    let filter = QuizFilter {
        product_id: query.product_id,
        is_published: Some(true),
    };
    let result = state.quiz_service.list(page, per_page, filter).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/play/quizzes/{id}/sessions",
    params(
        ("id" = Uuid, Path, description = "Published quiz ID")
    ),
    responses(
        (status = 201, description = "Session started, positioned at the first mission intro"),
        (status = 404, description = "Quiz not found or not published"),
        (status = 409, description = "Quiz has no playable questions")
    )
)]
#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.load_playable(id).await?;
    let snapshot = state.play_sessions.start(claims.user_id()?, quiz)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let snapshot = state.play_sessions.get(&token, claims.user_id()?)?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{token}/{action}",
    params(
        ("token" = String, Path, description = "Play session token"),
        ("action" = String, Path, description = "begin, select, confirm, decline, advance, retry or spend-life")
    ),
    responses(
        (status = 200, description = "Updated session view"),
        (status = 404, description = "Unknown session or action"),
        (status = 409, description = "Action not allowed in the current phase")
    )
)]
#[axum::debug_handler]
pub async fn apply_action(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((token, action)): Path<(String, String)>,
    payload: Option<Json<SelectPayload>>,
) -> Result<impl IntoResponse> {
    let action: PlayAction = action.parse()?;
    let selection = payload.map(|Json(p)| p.options).unwrap_or_default();
    let snapshot = state
        .play_sessions
        .apply(&token, claims.user_id()?, action, &selection)?;
    Ok(Json(snapshot))
}

#[axum::debug_handler]
pub async fn discard_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    state.play_sessions.discard(&token, claims.user_id()?)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UnlockedQuery {
    pub score: i32,
}

/// Achievements whose threshold the given score reaches.
#[axum::debug_handler]
pub async fn unlocked_achievements(
    State(state): State<AppState>,
    Query(query): Query<UnlockedQuery>,
) -> Result<impl IntoResponse> {
    let achievements = state.achievement_service.unlocked_by(query.score).await?;
    Ok(Json(achievements))
}

#[utoipa::path(
    get,
    path = "/api/results",
    params(
        ("score" = u32, Query, description = "Correct answers"),
        ("totalQuestions" = u32, Query, description = "Questions in the quiz"),
        ("timeSeconds" = Option<u64>, Query, description = "Elapsed seconds"),
        ("bonusLives" = Option<u32>, Query, description = "Bonus lives left"),
        ("sig" = Option<String>, Query, description = "Server signature of the other parameters")
    ),
    responses(
        (status = 200, description = "Results echoed back with a verification flag")
    )
)]
#[axum::debug_handler]
pub async fn results(Query(query): Query<ResultsQuery>) -> Result<impl IntoResponse> {
    let verified = match query.sig.as_deref() {
        Some(sig) => {
            let payload = crypto::results_query(&query.as_results());
            crypto::verify(&get_config().results_signing_secret, &payload, sig)
        }
        None => false,
    };
    if !verified {
        tracing::debug!(score = query.score, total = query.total_questions, "unverified results viewed");
    }
    Ok(Json(ResultsResponse::new(&query, verified)))
}
