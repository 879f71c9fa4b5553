use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub missions: Json<Vec<Mission>>,
    pub total_questions: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub question_ids: Vec<Uuid>,
    #[serde(default = "default_max_mistakes")]
    pub max_mistakes: u32,
    #[serde(default)]
    pub bonus_points: u32,
}

fn default_max_mistakes() -> u32 {
    1
}

/// Denormalized count stored on the quiz document.
pub fn count_questions(missions: &[Mission]) -> i32 {
    missions.iter().map(|m| m.question_ids.len() as i32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_defaults_allow_one_mistake() {
        let mission: Mission =
            serde_json::from_str(r#"{"id":"m1","title":"Bienvenida"}"#).unwrap();
        assert_eq!(mission.max_mistakes, 1);
        assert_eq!(mission.bonus_points, 0);
        assert!(mission.question_ids.is_empty());
    }

    #[test]
    fn counts_questions_across_missions() {
        let mission = |n: usize| Mission {
            id: "m".into(),
            title: "t".into(),
            narrative: String::new(),
            question_ids: (0..n).map(|_| Uuid::new_v4()).collect(),
            max_mistakes: 1,
            bonus_points: 0,
        };
        assert_eq!(count_questions(&[mission(2), mission(3)]), 5);
    }
}
