use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::content_dto::{paging, CreateQuestionPayload, QuestionListQuery},
    dto::import_dto::{ImportCommitResponse, ImportQuery},
    error::{Error, Result},
    services::import_service::ImportService,
    services::question_service::QuestionFilter,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/questions",
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Question shape rejected")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (product_id, question) = payload.into_new_question();
    let created = state.question_service.create(product_id, question).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/admin/questions",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("type" = Option<String>, Query, description = "Filter by question type"),
        ("search" = Option<String>, Query, description = "Search in question text")
    ),
    responses(
        (status = 200, description = "Paginated questions")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let (page, per_page) = paging(query.page, query.per_page);
    let filter = QuestionFilter {
        product_id: query.product_id,
        category: query.category.filter(|c| !c.trim().is_empty()),
        question_type: query.question_type,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let result = state.question_service.list(page, per_page, filter).await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get(id).await?;
    Ok(Json(question))
}

/// Full replacement; the editor always sends the whole question.
#[axum::debug_handler]
pub async fn replace_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (product_id, question) = payload.into_new_question();
    let updated = state
        .question_service
        .replace(id, product_id, question)
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.question_service.delete(id).await? {
        return Err(Error::NotFound("Question not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Reads the `file` part of an upload.
async fn read_upload(mut multipart: Multipart) -> Result<(Bytes, Option<String>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            if data.is_empty() {
                return Err(Error::BadRequest("Uploaded file is empty".into()));
            }
            return Ok((data, file_name));
        }
    }
    Err(Error::BadRequest("Missing file field".into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/questions/import/preview",
    responses(
        (status = 200, description = "Row-by-row validation report"),
        (status = 400, description = "Unreadable file or missing columns")
    )
)]
#[axum::debug_handler]
pub async fn preview_import(multipart: Multipart) -> Result<impl IntoResponse> {
    let (bytes, file_name) = read_upload(multipart).await?;
    let report = ImportService::analyze(&bytes, file_name.as_deref())?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/admin/questions/import",
    params(
        ("product_id" = Option<Uuid>, Query, description = "Product the questions belong to"),
        ("skip_invalid" = Option<bool>, Query, description = "Import valid rows even if others fail")
    ),
    responses(
        (status = 201, description = "Questions imported"),
        (status = 422, description = "Some rows are invalid; nothing was written")
    )
)]
#[axum::debug_handler]
pub async fn commit_import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    multipart: Multipart,
) -> Result<Response> {
    let (bytes, file_name) = read_upload(multipart).await?;
    let report = ImportService::analyze(&bytes, file_name.as_deref())?;

    if report.invalid_rows > 0 && !query.skip_invalid {
        tracing::info!(invalid = report.invalid_rows, "import refused");
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response());
    }
    if report.questions.is_empty() {
        return Err(Error::BadRequest("No valid rows to import".into()));
    }

    let imported = state
        .question_service
        .create_many(query.product_id, &report.questions)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportCommitResponse { imported, report }),
    )
        .into_response())
}
