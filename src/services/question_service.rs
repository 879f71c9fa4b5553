use crate::dto::content_dto::Paginated;
use crate::error::Result;
use crate::models::question::{NewQuestion, Question, QuestionType};
use crate::utils::validation::reject_if_any;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct QuestionFilter {
    pub product_id: Option<Uuid>,
    pub category: Option<String>,
    pub question_type: Option<QuestionType>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product_id: Option<Uuid>, question: NewQuestion) -> Result<Question> {
        reject_if_any(question.shape_errors())?;
        insert_question(&self.pool, product_id, &question).await
    }

    /// Writes every question or none of them.
    pub async fn create_many(
        &self,
        product_id: Option<Uuid>,
        questions: &[NewQuestion],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for question in questions {
            insert_question(&mut *tx, product_id, question).await?;
        }
        tx.commit().await?;
        tracing::info!(count = questions.len(), ?product_id, "questions imported");
        Ok(questions.len())
    }

    pub async fn get(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(question)
    }

    /// Fetches the given ids; unknown ids are simply absent from the result.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let questions =
            sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(questions)
    }

    pub async fn replace(
        &self,
        id: Uuid,
        product_id: Option<Uuid>,
        question: NewQuestion,
    ) -> Result<Question> {
        reject_if_any(question.shape_errors())?;
        let updated = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET
                product_id = $1,
                text = $2,
                question_type = $3,
                options = $4,
                difficulty = $5,
                category = $6,
                tags = $7,
                explanation = $8,
                tricky_hint = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(&question.text)
        .bind(question.question_type)
        .bind(Json(&question.options))
        .bind(question.difficulty)
        .bind(&question.category)
        .bind(&question.tags)
        .bind(&question.explanation)
        .bind(&question.tricky_hint)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        filter: QuestionFilter,
    ) -> Result<Paginated<Question>> {
        let offset = (page - 1) * per_page;
        let search = filter.search.map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::question_type IS NULL OR question_type = $3)
              AND ($4::text IS NULL OR text ILIKE $4)
            "#,
        )
        .bind(filter.product_id)
        .bind(&filter.category)
        .bind(filter.question_type)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::question_type IS NULL OR question_type = $3)
              AND ($4::text IS NULL OR text ILIKE $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.product_id)
        .bind(&filter.category)
        .bind(filter.question_type)
        .bind(&search)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, page, per_page))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_question<'e, E>(
    executor: E,
    product_id: Option<Uuid>,
    question: &NewQuestion,
) -> Result<Question>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (
            product_id, text, question_type, options, difficulty,
            category, tags, explanation, tricky_hint
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(product_id)
    .bind(&question.text)
    .bind(question.question_type)
    .bind(Json(&question.options))
    .bind(question.difficulty)
    .bind(&question.category)
    .bind(&question.tags)
    .bind(&question.explanation)
    .bind(&question.tricky_hint)
    .fetch_one(executor)
    .await?;
    Ok(row)
}
