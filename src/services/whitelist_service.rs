use crate::dto::content_dto::CreateWhitelistPayload;
use crate::error::Result;
use crate::models::user::UserRole;
use crate::models::whitelist::{normalize_email, WhitelistEntry};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct WhitelistService {
    pool: PgPool,
}

impl WhitelistService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateWhitelistPayload) -> Result<WhitelistEntry> {
        let entry = sqlx::query_as::<_, WhitelistEntry>(
            r#"
            INSERT INTO whitelist_entries (email, role, organization_id, product_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(normalize_email(&payload.email))
        .bind(payload.role.unwrap_or(UserRole::Seller))
        .bind(payload.organization_id)
        .bind(payload.product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn find_pending(&self, email: &str) -> Result<Option<WhitelistEntry>> {
        let entry = sqlx::query_as::<_, WhitelistEntry>(
            "SELECT * FROM whitelist_entries WHERE email = $1 AND consumed_at IS NULL",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn list(&self, organization_id: Option<Uuid>) -> Result<Vec<WhitelistEntry>> {
        let entries = sqlx::query_as::<_, WhitelistEntry>(
            r#"
            SELECT * FROM whitelist_entries
            WHERE ($1::uuid IS NULL OR organization_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM whitelist_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
