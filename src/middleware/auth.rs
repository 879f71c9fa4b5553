use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::Unauthorized("malformed subject".to_string()))
    }

    pub fn role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }
}

pub fn decode_claims(token: &str, secret: &str) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn bearer_claims(req: &Request) -> std::result::Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    decode_claims(token, &config.jwt_secret)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))
}

async fn require_roles(mut req: Request, next: Next, allowed: &[UserRole]) -> Response {
    let claims = match bearer_claims(&req) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    if !allowed.is_empty() {
        let permitted = claims.role().map(|r| allowed.contains(&r)).unwrap_or(false);
        if !permitted {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "hint": "Ask an administrator to grant your account the required role"
                })),
            )
                .into_response();
        }
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Any signed-in user.
pub async fn require_session(req: Request, next: Next) -> Response {
    require_roles(req, next, &[]).await
}

/// Content editors: admins and managers.
pub async fn require_editor(req: Request, next: Next) -> Response {
    require_roles(req, next, &[UserRole::Admin, UserRole::Manager]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, &[UserRole::Admin]).await
}
