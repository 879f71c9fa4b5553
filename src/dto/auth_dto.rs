use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use validator::Validate;

use crate::models::user::UserProfile;

#[derive(Debug, Deserialize, Validate)]
pub struct SignInPayload {
    #[validate(length(min = 1, message = "id_token cannot be empty"))]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub first_login: bool,
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingAnswersPayload {
    pub answers: Map<String, JsonValue>,
}
