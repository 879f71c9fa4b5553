use crate::dto::content_dto::{CreateJourneyPayload, UpdateJourneyPayload};
use crate::error::{Error, Result};
use crate::models::journey::{normalize_steps, reorder_steps, Journey};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct JourneyService {
    pool: PgPool,
}

impl JourneyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateJourneyPayload) -> Result<Journey> {
        let steps = normalize_steps(payload.steps);
        let journey = sqlx::query_as::<_, Journey>(
            r#"
            INSERT INTO journeys (title, description, steps)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.description)
        .bind(Json(&steps))
        .fetch_one(&self.pool)
        .await?;
        Ok(journey)
    }

    pub async fn get(&self, id: Uuid) -> Result<Journey> {
        let journey = sqlx::query_as::<_, Journey>("SELECT * FROM journeys WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(journey)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateJourneyPayload) -> Result<Journey> {
        let steps = payload.steps.map(normalize_steps);
        let journey = sqlx::query_as::<_, Journey>(
            r#"
            UPDATE journeys
            SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                steps = COALESCE($3, steps),
                is_published = COALESCE($4, is_published),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(payload.title)
        .bind(payload.description)
        .bind(steps.as_ref().map(Json))
        .bind(payload.is_published)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(journey)
    }

    pub async fn reorder_steps(&self, id: Uuid, step_ids: &[Uuid]) -> Result<Journey> {
        let journey = self.get(id).await?;
        let steps = reorder_steps(&journey.steps.0, step_ids).ok_or_else(|| {
            Error::BadRequest("step_ids must list every step of the journey exactly once".to_string())
        })?;
        let journey = sqlx::query_as::<_, Journey>(
            "UPDATE journeys SET steps = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(Json(&steps))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(journey)
    }

    pub async fn list(&self, is_published: Option<bool>) -> Result<Vec<Journey>> {
        let journeys = sqlx::query_as::<_, Journey>(
            r#"
            SELECT * FROM journeys
            WHERE ($1::bool IS NULL OR is_published = $1)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(is_published)
        .fetch_all(&self.pool)
        .await?;
        Ok(journeys)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM journeys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
