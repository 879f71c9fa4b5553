use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Journey {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub steps: Json<Vec<JourneyStep>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStep {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub kind: StepKind,
    pub reference_id: Option<Uuid>,
    #[serde(default)]
    pub position: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Quiz,
    Onboarding,
    Content,
}

/// Sorts by the submitted position and rewrites positions as 0..n.
pub fn normalize_steps(mut steps: Vec<JourneyStep>) -> Vec<JourneyStep> {
    steps.sort_by_key(|s| s.position);
    for (idx, step) in steps.iter_mut().enumerate() {
        step.position = idx as u32;
    }
    steps
}

/// Applies an explicit ordering of step ids. Every existing step must be
/// listed exactly once.
pub fn reorder_steps(steps: &[JourneyStep], order: &[Uuid]) -> Option<Vec<JourneyStep>> {
    if order.len() != steps.len() {
        return None;
    }
    let mut reordered = Vec::with_capacity(steps.len());
    for (position, id) in order.iter().enumerate() {
        let step = steps.iter().find(|s| s.id == *id)?;
        if reordered.iter().any(|s: &JourneyStep| s.id == *id) {
            return None;
        }
        reordered.push(JourneyStep {
            position: position as u32,
            ..step.clone()
        });
    }
    Some(reordered)
}
