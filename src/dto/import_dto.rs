use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::NewQuestion;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ImportQuery {
    pub product_id: Option<Uuid>,
    pub skip_invalid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based, counting the header as row 1.
    pub row: usize,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub errors: Vec<RowError>,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Serialize)]
pub struct ImportCommitResponse {
    pub imported: usize,
    pub report: ImportReport,
}
