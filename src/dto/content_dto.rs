use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::journey::JourneyStep;
use crate::models::onboarding_field::FieldType;
use crate::models::question::{Difficulty, NewQuestion, QuestionOption, QuestionType};
use crate::models::quiz::Mission;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, message = "Organization name cannot be empty"))]
    pub name: String,
    pub email_domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: String,
    pub organization_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProductPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, message = "La pregunta es obligatoria"))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
    /// Either a list or a comma separated string.
    #[serde(default)]
    pub tags: TagsInput,
    pub explanation: Option<String>,
    pub tricky_hint: Option<String>,
}

impl CreateQuestionPayload {
    pub fn into_new_question(self) -> (Option<Uuid>, NewQuestion) {
        (
            self.product_id,
            NewQuestion {
                text: self.text.trim().to_string(),
                question_type: self.question_type,
                options: self
                    .options
                    .into_iter()
                    .map(|o| QuestionOption {
                        text: o.text.trim().to_string(),
                        is_correct: o.is_correct,
                    })
                    .filter(|o| !o.text.is_empty())
                    .collect(),
                difficulty: self.difficulty.unwrap_or_default(),
                category: self.category.filter(|c| !c.trim().is_empty()),
                tags: self.tags.into_tags(),
                explanation: self.explanation.filter(|e| !e.trim().is_empty()),
                tricky_hint: self.tricky_hint.filter(|h| !h.trim().is_empty()),
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
    #[default]
    #[serde(skip)]
    Empty,
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagsInput::Text(raw) => crate::models::question::split_tags(&raw),
            TagsInput::Empty => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizPayload {
    #[validate(length(min = 1, message = "Quiz title cannot be empty"))]
    pub title: String,
    pub product_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(default)]
    pub missions: Vec<Mission>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuizPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,
    pub product_id: Option<Uuid>,
    pub missions: Option<Vec<Mission>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishPayload {
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOnboardingFieldPayload {
    #[validate(length(min = 1, message = "Label cannot be empty"))]
    pub label: String,
    #[validate(length(min = 1, message = "Field key cannot be empty"))]
    pub field_key: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOnboardingFieldPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJourneyPayload {
    #[validate(length(min = 1, message = "Journey title cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<JourneyStep>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateJourneyPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,
    pub steps: Option<Vec<JourneyStep>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderStepsPayload {
    pub step_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAchievementPayload {
    #[validate(length(min = 1, message = "Achievement title cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[validate(range(min = 0))]
    pub threshold_score: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWhitelistPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Option<UserRole>,
    pub organization_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRolePayload {
    pub role: UserRole,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub product_id: Option<Uuid>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct QuizListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub product_id: Option<Uuid>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct WhitelistQuery {
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct JourneyListQuery {
    pub is_published: Option<bool>,
}

/// Shared `page` / `per_page` handling for the list queries above.
pub fn paging(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    PageQuery { page, per_page }.resolve()
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

// Trims strings and turns empty ones into None.
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
