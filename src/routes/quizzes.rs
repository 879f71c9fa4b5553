use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::content_dto::{paging, CreateQuizPayload, PublishPayload, QuizListQuery, UpdateQuizPayload},
    error::{Error, Result},
    services::quiz_service::QuizFilter,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/quizzes",
    responses(
        (status = 201, description = "Quiz created as a draft"),
        (status = 400, description = "Invalid missions")
    )
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/admin/quizzes",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("is_published" = Option<bool>, Query, description = "Filter by publication state")
    ),
    responses(
        (status = 200, description = "Paginated quizzes")
    )
)]
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    let (page, per_page) = paging(query.page, query.per_page);
    let filter = QuizFilter {
        product_id: query.product_id,
        is_published: query.is_published,
    };
    let result = state.quiz_service.list(page, per_page, filter).await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get(id).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    patch,
    path = "/api/admin/quizzes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz updated"),
        (status = 400, description = "Invalid missions"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.update(id, payload).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    post,
    path = "/api/admin/quizzes/{id}/publish",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Publication state changed"),
        (status = 400, description = "Quiz has no questions")
    )
)]
#[axum::debug_handler]
pub async fn publish_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishPayload>,
) -> Result<impl IntoResponse> {
    let quiz = state
        .quiz_service
        .set_published(id, payload.is_published)
        .await?;
    Ok(Json(quiz))
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.quiz_service.delete(id).await? {
        return Err(Error::NotFound("Quiz not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
