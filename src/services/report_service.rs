use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductCount {
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub questions: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoleCount {
    pub role: UserRole,
    pub users: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub questions_per_product: Vec<ProductCount>,
    pub total_questions: i64,
    pub quizzes_published: i64,
    pub quizzes_draft: i64,
    pub users_per_role: Vec<RoleCount>,
    pub pending_invitations: i64,
    pub journeys: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self) -> Result<OverviewReport> {
        // Questions without a product are reported under a null product.
        let questions_per_product = sqlx::query_as::<_, ProductCount>(
            r#"
            SELECT q.product_id, p.name AS product_name, COUNT(*) AS questions
            FROM questions q
            LEFT JOIN products p ON p.id = q.product_id
            GROUP BY q.product_id, p.name
            ORDER BY questions DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let (quizzes_published, quizzes_draft): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE is_published),
                COUNT(*) FILTER (WHERE NOT is_published)
            FROM quizzes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let users_per_role = sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS users FROM user_profiles GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await?;

        let pending_invitations: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM whitelist_entries WHERE consumed_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        let journeys: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journeys")
            .fetch_one(&self.pool)
            .await?;

        let total_questions = questions_per_product.iter().map(|p| p.questions).sum();

        Ok(OverviewReport {
            questions_per_product,
            total_questions,
            quizzes_published,
            quizzes_draft,
            users_per_role,
            pending_invitations,
            journeys,
            generated_at: Utc::now(),
        })
    }
}
