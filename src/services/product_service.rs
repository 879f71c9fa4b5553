use crate::dto::content_dto::{CreateProductPayload, Paginated, UpdateProductPayload};
use crate::error::Result;
use crate::models::product::Product;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateProductPayload) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, organization_id, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.organization_id)
        .bind(payload.description)
        .bind(payload.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateProductPayload) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        is_active: Option<bool>,
    ) -> Result<Paginated<Product>> {
        let offset = (page - 1) * per_page;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE ($1::bool IS NULL OR is_active = $1)",
        )
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::bool IS NULL OR is_active = $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(is_active)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, page, per_page))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
