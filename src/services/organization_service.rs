use crate::dto::content_dto::CreateOrganizationPayload;
use crate::error::Result;
use crate::models::organization::Organization;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrganizationService {
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateOrganizationPayload) -> Result<Organization> {
        let domain = payload
            .email_domain
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty());
        let org = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, email_domain) VALUES ($1, $2) RETURNING *",
        )
        .bind(payload.name.trim())
        .bind(domain)
        .fetch_one(&self.pool)
        .await?;
        Ok(org)
    }

    pub async fn list(&self) -> Result<Vec<Organization>> {
        let orgs = sqlx::query_as::<_, Organization>("SELECT * FROM organizations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(orgs)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
