use crate::dto::content_dto::{CreateOnboardingFieldPayload, UpdateOnboardingFieldPayload};
use crate::error::{Error, Result};
use crate::models::onboarding_field::{FieldType, OnboardingField};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct OnboardingService {
    pool: PgPool,
}

impl OnboardingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateOnboardingFieldPayload) -> Result<OnboardingField> {
        check_select_options(payload.field_type, &payload.options)?;
        let position = match payload.position {
            Some(p) => p,
            None => {
                sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(position) + 1, 0) FROM onboarding_fields",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };
        let field = sqlx::query_as::<_, OnboardingField>(
            r#"
            INSERT INTO onboarding_fields (label, field_key, field_type, required, options, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.label.trim())
        .bind(slug_key(&payload.field_key))
        .bind(payload.field_type)
        .bind(payload.required)
        .bind(&payload.options)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;
        Ok(field)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateOnboardingFieldPayload) -> Result<OnboardingField> {
        let current = self.get(id).await?;
        let field_type = payload.field_type.unwrap_or(current.field_type);
        let options = payload.options.clone().unwrap_or_else(|| current.options.clone());
        check_select_options(field_type, &options)?;

        let field = sqlx::query_as::<_, OnboardingField>(
            r#"
            UPDATE onboarding_fields
            SET
                label = COALESCE($1, label),
                field_type = COALESCE($2, field_type),
                required = COALESCE($3, required),
                options = COALESCE($4, options),
                position = COALESCE($5, position)
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(payload.label)
        .bind(payload.field_type)
        .bind(payload.required)
        .bind(payload.options)
        .bind(payload.position)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(field)
    }

    pub async fn get(&self, id: Uuid) -> Result<OnboardingField> {
        let field = sqlx::query_as::<_, OnboardingField>("SELECT * FROM onboarding_fields WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(field)
    }

    pub async fn list(&self) -> Result<Vec<OnboardingField>> {
        let fields = sqlx::query_as::<_, OnboardingField>(
            "SELECT * FROM onboarding_fields ORDER BY position ASC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM onboarding_fields WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn check_select_options(field_type: FieldType, options: &[String]) -> Result<()> {
    if field_type == FieldType::Select && options.iter().filter(|o| !o.trim().is_empty()).count() < 2 {
        return Err(Error::BadRequest(
            "Select fields need at least 2 options".to_string(),
        ));
    }
    Ok(())
}

/// `"Fecha de Ingreso"` -> `"fecha_de_ingreso"`.
pub fn slug_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_key_collapses_separators() {
        assert_eq!(slug_key(" Fecha de  Ingreso! "), "fecha_de_ingreso");
    }

    #[test]
    fn select_needs_two_options() {
        assert!(check_select_options(FieldType::Select, &["Sí".into()]).is_err());
        assert!(check_select_options(FieldType::Select, &["Sí".into(), "No".into()]).is_ok());
        assert!(check_select_options(FieldType::Text, &[]).is_ok());
    }
}
