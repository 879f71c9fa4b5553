use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};

use crate::{
    error::Result,
    services::export_service::{ExportService, XLSX_CONTENT_TYPE},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/reports/overview",
    responses(
        (status = 200, description = "Content and user counts")
    )
)]
#[axum::debug_handler]
pub async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let report = state.report_service.overview().await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/overview.xlsx",
    responses(
        (status = 200, description = "Overview as a spreadsheet")
    )
)]
#[axum::debug_handler]
pub async fn overview_xlsx(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let report = state.report_service.overview().await?;
    let buffer = ExportService::generate_overview_xlsx(&report)?;
    let filename = format!(
        "desafio_aviva_resumen_{}.xlsx",
        report.generated_at.format("%Y%m%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
