use serde::{Deserialize, Serialize};

use crate::services::quiz_engine::QuizResults;

#[derive(Debug, Deserialize)]
pub struct SelectPayload {
    /// Zero-based option indices.
    pub options: Vec<usize>,
}

/// Query parameters of the results screen, exactly as handed off.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub time_seconds: u64,
    #[serde(default)]
    pub bonus_lives: u32,
    pub sig: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub score: u32,
    pub total_questions: u32,
    pub time_seconds: u64,
    pub bonus_lives: u32,
    pub percentage: f64,
    pub verified: bool,
}

impl ResultsQuery {
    /// Rebuilds the results exactly as they were signed.
    pub fn as_results(&self) -> QuizResults {
        QuizResults {
            score: self.score,
            total_questions: self.total_questions,
            elapsed_seconds: self.time_seconds,
            bonus_lives: self.bonus_lives,
            bonus_points: 0,
        }
    }
}

impl ResultsResponse {
    pub fn new(query: &ResultsQuery, verified: bool) -> Self {
        let percentage = if query.total_questions == 0 {
            0.0
        } else {
            (f64::from(query.score) / f64::from(query.total_questions) * 100.0).round()
        };
        Self {
            score: query.score,
            total_questions: query.total_questions,
            time_seconds: query.time_seconds,
            bonus_lives: query.bonus_lives,
            percentage,
            verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(score: u32, total: u32) -> ResultsQuery {
        ResultsQuery {
            score,
            total_questions: total,
            time_seconds: 61,
            bonus_lives: 0,
            sig: None,
        }
    }

    #[test]
    fn percentage_is_rounded_and_safe_for_empty_quizzes() {
        assert_eq!(ResultsResponse::new(&query(2, 3), false).percentage, 67.0);
        assert_eq!(ResultsResponse::new(&query(0, 0), false).percentage, 0.0);
    }

    #[test]
    fn camel_case_parameters_are_read() {
        let q: ResultsQuery =
            serde_json::from_value(serde_json::json!({"score": 4, "totalQuestions": 4, "timeSeconds": 9}))
                .unwrap();
        assert_eq!(q.total_questions, 4);
        assert_eq!(q.time_seconds, 9);
        assert!(q.sig.is_none());
    }
}
