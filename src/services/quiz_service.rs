use crate::dto::content_dto::{CreateQuizPayload, Paginated, UpdateQuizPayload};
use crate::error::{Error, Result};
use crate::models::quiz::{count_questions, Mission, Quiz};
use crate::services::question_service::QuestionService;
use crate::services::quiz_engine::PlayableQuiz;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct QuizFilter {
    pub product_id: Option<Uuid>,
    pub is_published: Option<bool>,
}

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    questions: QuestionService,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        let questions = QuestionService::new(pool.clone());
        Self { pool, questions }
    }

    pub async fn create(&self, payload: CreateQuizPayload) -> Result<Quiz> {
        let missions = self.checked_missions(payload.missions).await?;
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (title, product_id, description, missions, total_questions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.product_id)
        .bind(payload.description)
        .bind(Json(&missions))
        .bind(count_questions(&missions))
        .fetch_one(&self.pool)
        .await?;
        Ok(quiz)
    }

    pub async fn get(&self, id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(quiz)
    }

    /// Partial update. Replacing the missions recomputes the denormalized
    /// question count in the same statement.
    pub async fn update(&self, id: Uuid, payload: UpdateQuizPayload) -> Result<Quiz> {
        let missions = match payload.missions {
            Some(missions) => Some(self.checked_missions(missions).await?),
            None => None,
        };
        let total = missions.as_deref().map(count_questions);
        if total == Some(0) {
            let current = self.get(id).await?;
            ensure_playable(current.is_published, 0)?;
        }

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                product_id = COALESCE($3, product_id),
                missions = COALESCE($4, missions),
                total_questions = COALESCE($5, total_questions),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.product_id)
        .bind(missions.as_ref().map(Json))
        .bind(total)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(quiz)
    }

    pub async fn set_published(&self, id: Uuid, is_published: bool) -> Result<Quiz> {
        if is_published {
            let quiz = self.get(id).await?;
            ensure_playable(true, quiz.total_questions)?;
        }
        let quiz = sqlx::query_as::<_, Quiz>(
            "UPDATE quizzes SET is_published = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(is_published)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(quiz_id = %id, is_published, "quiz publication changed");
        Ok(quiz)
    }

    pub async fn list(&self, page: i64, per_page: i64, filter: QuizFilter) -> Result<Paginated<Quiz>> {
        let offset = (page - 1) * per_page;
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM quizzes
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::bool IS NULL OR is_published = $2)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.is_published)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT * FROM quizzes
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::bool IS NULL OR is_published = $2)
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.is_published)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, page, per_page))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Loads a published quiz together with the questions its missions
    /// reference, flattened for play.
    pub async fn load_playable(&self, id: Uuid) -> Result<PlayableQuiz> {
        let quiz = self.get(id).await?;
        if !quiz.is_published {
            return Err(Error::NotFound("Quiz not found".to_string()));
        }
        let ids: Vec<Uuid> = quiz
            .missions
            .0
            .iter()
            .flat_map(|m| m.question_ids.iter().copied())
            .collect();
        let bank = self.questions.get_many(&ids).await?;
        Ok(PlayableQuiz::assemble(&quiz, &bank))
    }

    /// Mission picker rules: ids filled in, titles present, referenced
    /// questions exist, and no question appears twice in one quiz.
    async fn checked_missions(&self, missions: Vec<Mission>) -> Result<Vec<Mission>> {
        let missions = normalize_missions(missions)?;
        let ids: Vec<Uuid> = missions
            .iter()
            .flat_map(|m| m.question_ids.iter().copied())
            .collect();
        let found: HashSet<Uuid> = self
            .questions
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::BadRequest(format!(
                "Unknown questions: {}",
                missing.join(", ")
            )));
        }
        Ok(missions)
    }
}

/// A published quiz must always have something to play.
fn ensure_playable(is_published: bool, total_questions: i32) -> Result<()> {
    if is_published && total_questions == 0 {
        return Err(Error::BadRequest(
            "Cannot publish a quiz without questions".to_string(),
        ));
    }
    Ok(())
}

pub fn normalize_missions(missions: Vec<Mission>) -> Result<Vec<Mission>> {
    let mut seen = HashSet::new();
    missions
        .into_iter()
        .map(|mut m| {
            if m.title.trim().is_empty() {
                return Err(Error::BadRequest("Mission title cannot be empty".to_string()));
            }
            if m.id.trim().is_empty() {
                m.id = Uuid::new_v4().to_string();
            }
            if let Some(dup) = m.question_ids.iter().find(|id| !seen.insert(**id)) {
                return Err(Error::BadRequest(format!(
                    "Question {} is used more than once",
                    dup
                )));
            }
            Ok(m)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission(id: &str, title: &str, question_ids: Vec<Uuid>) -> Mission {
        Mission {
            id: id.to_string(),
            title: title.to_string(),
            narrative: String::new(),
            question_ids,
            max_mistakes: 1,
            bonus_points: 0,
        }
    }

    #[test]
    fn missing_mission_ids_are_generated() {
        let missions = normalize_missions(vec![mission("", "Inicio", vec![Uuid::new_v4()])]).unwrap();
        assert!(Uuid::parse_str(&missions[0].id).is_ok());
    }

    #[test]
    fn repeated_question_is_rejected() {
        let q = Uuid::new_v4();
        let err = normalize_missions(vec![
            mission("a", "Uno", vec![q]),
            mission("b", "Dos", vec![q]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn published_quiz_needs_questions() {
        assert!(matches!(ensure_playable(true, 0), Err(Error::BadRequest(_))));
        assert!(ensure_playable(true, 3).is_ok());
        assert!(ensure_playable(false, 0).is_ok());
    }

    #[test]
    fn untitled_mission_is_rejected() {
        assert!(normalize_missions(vec![mission("a", "  ", vec![])]).is_err());
    }
}
