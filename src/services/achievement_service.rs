use crate::dto::content_dto::CreateAchievementPayload;
use crate::error::Result;
use crate::models::achievement::Achievement;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AchievementService {
    pool: PgPool,
}

impl AchievementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateAchievementPayload) -> Result<Achievement> {
        let row = sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements (title, description, icon, threshold_score)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.description)
        .bind(payload.icon)
        .bind(payload.threshold_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            "SELECT * FROM achievements ORDER BY threshold_score ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Achievements unlocked by a final score.
    pub async fn unlocked_by(&self, score: i32) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            "SELECT * FROM achievements WHERE threshold_score <= $1 ORDER BY threshold_score DESC",
        )
        .bind(score)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM achievements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
