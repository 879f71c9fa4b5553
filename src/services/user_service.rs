use crate::error::{Error, Result};
use crate::models::user::{UserProfile, UserRole};
use serde_json::{Map, Value as JsonValue};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn get(&self, id: Uuid) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Creates the profile and, when it came from an invitation, consumes
    /// that whitelist entry in the same transaction.
    pub async fn create(&self, new: NewProfile, invitation_id: Option<Uuid>) -> Result<UserProfile> {
        let mut tx = self.pool.begin().await?;
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (email, display_name, role, organization_id, product_id, last_login_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(&new.email)
        .bind(&new.display_name)
        .bind(new.role)
        .bind(new.organization_id)
        .bind(new.product_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(id) = invitation_id {
            let consumed = sqlx::query(
                "UPDATE whitelist_entries SET consumed_at = NOW() WHERE id = $1 AND consumed_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            if consumed.rows_affected() == 0 {
                return Err(Error::Conflict("Invitation was already used".to_string()));
            }
        }

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn touch_login(&self, id: Uuid, display_name: Option<&str>) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET last_login_at = NOW(), display_name = COALESCE(display_name, $1)
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(display_name)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole, product_id: Option<Uuid>) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET role = $1, product_id = COALESCE($2, product_id)
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(role)
        .bind(product_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = %id, role = role.as_str(), "user role changed");
        Ok(profile)
    }

    pub async fn save_onboarding(&self, id: Uuid, answers: Map<String, JsonValue>) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "UPDATE user_profiles SET onboarding = $1 WHERE id = $2 RETURNING *",
        )
        .bind(JsonValue::Object(answers))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT * FROM user_profiles
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }
}
