use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = json!({
        "status": "ok",
        "play_sessions": state.play_sessions.len()?,
    });
    Ok((StatusCode::OK, Json(body)))
}
