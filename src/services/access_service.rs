use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{UserProfile, UserRole};
use crate::models::whitelist::{normalize_email, WhitelistEntry};
use crate::services::user_service::{NewProfile, UserService};
use crate::services::whitelist_service::WhitelistService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
}

/// Reads the identity provider's token-info answer. `email_verified` may be
/// a boolean or the string `"true"`.
pub fn parse_tokeninfo(body: &JsonValue, audience: Option<&str>) -> Result<VerifiedIdentity> {
    if let Some(expected) = audience {
        if body.get("aud").and_then(|v| v.as_str()) != Some(expected) {
            return Err(Error::Unauthorized("token issued for another audience".to_string()));
        }
    }
    let verified = match body.get("email_verified") {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };
    if !verified {
        return Err(Error::Unauthorized("email is not verified".to_string()));
    }
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .map(normalize_email)
        .filter(|e| e.contains('@'))
        .ok_or_else(|| Error::Unauthorized("token carries no email".to_string()))?;
    let name = body.get("name").and_then(|v| v.as_str()).map(str::to_string);
    Ok(VerifiedIdentity { email, name })
}

#[derive(Clone)]
pub struct TokenInfoVerifier {
    client: Client,
    tokeninfo_url: String,
    audience: Option<String>,
}

impl TokenInfoVerifier {
    pub fn new(client: Client, tokeninfo_url: String, audience: Option<String>) -> Self {
        Self {
            client,
            tokeninfo_url,
            audience,
        }
    }

    pub async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "identity provider rejected token");
            return Err(Error::Unauthorized("invalid identity token".to_string()));
        }
        let body: JsonValue = response.json().await?;
        parse_tokeninfo(&body, self.audience.as_deref())
    }
}

/// Who may sign in and with which initial role.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub allowed_domains: Vec<String>,
    pub allowed_emails: Vec<String>,
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialAccess {
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

impl AccessPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_domains: config.allowed_email_domains.clone(),
            allowed_emails: config.allowed_emails.clone(),
            admin_emails: config.admin_emails.clone(),
        }
    }

    fn domain_allowed(&self, email: &str) -> bool {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        self.allowed_domains.iter().any(|allowed| {
            let allowed = allowed.trim_start_matches('@');
            domain == allowed || domain.ends_with(&format!(".{}", allowed))
        })
    }

    pub fn is_allowed(&self, email: &str, invited: bool) -> bool {
        invited
            || self.admin_emails.iter().any(|e| e == email)
            || self.allowed_emails.iter().any(|e| e == email)
            || self.domain_allowed(email)
    }

    /// Invitation wins over the static admin list; everyone else sells.
    pub fn initial_access(&self, email: &str, invitation: Option<&WhitelistEntry>) -> InitialAccess {
        if let Some(entry) = invitation {
            return InitialAccess {
                role: entry.role,
                organization_id: entry.organization_id,
                product_id: entry.product_id,
            };
        }
        let role = if self.admin_emails.iter().any(|e| e == email) {
            UserRole::Admin
        } else {
            UserRole::Seller
        };
        InitialAccess {
            role,
            organization_id: None,
            product_id: None,
        }
    }
}

#[derive(Debug)]
pub struct SignInOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub first_login: bool,
    pub profile: UserProfile,
}

#[derive(Clone)]
pub struct AccessService {
    verifier: TokenInfoVerifier,
    policy: AccessPolicy,
    users: UserService,
    whitelist: WhitelistService,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AccessService {
    pub fn new(
        verifier: TokenInfoVerifier,
        policy: AccessPolicy,
        users: UserService,
        whitelist: WhitelistService,
        jwt_secret: String,
        session_ttl: Duration,
    ) -> Self {
        Self {
            verifier,
            policy,
            users,
            whitelist,
            jwt_secret,
            session_ttl,
        }
    }

    pub async fn sign_in(&self, id_token: &str) -> Result<SignInOutcome> {
        let identity = self.verifier.verify(id_token).await?;

        if let Some(existing) = self.users.find_by_email(&identity.email).await? {
            let profile = self
                .users
                .touch_login(existing.id, identity.name.as_deref())
                .await?;
            let (token, expires_at) = issue_token(&self.jwt_secret, &profile, self.session_ttl)?;
            return Ok(SignInOutcome {
                token,
                expires_at,
                first_login: false,
                profile,
            });
        }

        let invitation = self.whitelist.find_pending(&identity.email).await?;
        if !self.policy.is_allowed(&identity.email, invitation.is_some()) {
            tracing::warn!(email = %identity.email, "sign-in refused");
            return Err(Error::permission(
                "This account is not authorized to use the application",
                "Ask an administrator to add your email to the whitelist",
            ));
        }

        let access = self.policy.initial_access(&identity.email, invitation.as_ref());
        let profile = self
            .users
            .create(
                NewProfile {
                    email: identity.email.clone(),
                    display_name: identity.name.clone(),
                    role: access.role,
                    organization_id: access.organization_id,
                    product_id: access.product_id,
                },
                invitation.as_ref().map(|entry| entry.id),
            )
            .await?;
        tracing::info!(user_id = %profile.id, role = profile.role.as_str(), "first sign-in");

        let (token, expires_at) = issue_token(&self.jwt_secret, &profile, self.session_ttl)?;
        Ok(SignInOutcome {
            token,
            expires_at,
            first_login: true,
            profile,
        })
    }
}

pub fn issue_token(
    secret: &str,
    profile: &UserProfile,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>)> {
    let expires_at = Utc::now() + ttl;
    let claims = Claims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        role: profile.role.as_str().to_string(),
        exp: expires_at.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> AccessPolicy {
        AccessPolicy {
            allowed_domains: vec!["aviva.com.mx".into()],
            allowed_emails: vec!["consultor@gmail.com".into()],
            admin_emails: vec!["jefa@gmail.com".into()],
        }
    }

    fn invitation(role: UserRole) -> WhitelistEntry {
        WhitelistEntry {
            id: Uuid::new_v4(),
            organization_id: Some(Uuid::new_v4()),
            email: "nuevo@otra.com".into(),
            role,
            product_id: Some(Uuid::new_v4()),
            consumed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn domain_suffix_and_lists_are_allowed() {
        let p = policy();
        assert!(p.is_allowed("ana@aviva.com.mx", false));
        assert!(p.is_allowed("ana@ventas.aviva.com.mx", false));
        assert!(!p.is_allowed("ana@notaviva.com.mx", false));
        assert!(p.is_allowed("consultor@gmail.com", false));
        assert!(p.is_allowed("jefa@gmail.com", false));
        assert!(!p.is_allowed("random@gmail.com", false));
        assert!(p.is_allowed("random@gmail.com", true));
    }

    #[test]
    fn invitation_decides_initial_role_and_product() {
        let p = policy();
        let entry = invitation(UserRole::Manager);
        let access = p.initial_access("nuevo@otra.com", Some(&entry));
        assert_eq!(access.role, UserRole::Manager);
        assert_eq!(access.product_id, entry.product_id);

        assert_eq!(p.initial_access("jefa@gmail.com", None).role, UserRole::Admin);
        assert_eq!(p.initial_access("ana@aviva.com.mx", None).role, UserRole::Seller);
    }

    #[test]
    fn tokeninfo_requires_verified_email() {
        let ok = parse_tokeninfo(
            &json!({"email": "Ana@Aviva.com.mx", "email_verified": "true", "aud": "client-1", "name": "Ana"}),
            Some("client-1"),
        )
        .unwrap();
        assert_eq!(ok.email, "ana@aviva.com.mx");
        assert_eq!(ok.name.as_deref(), Some("Ana"));

        assert!(parse_tokeninfo(&json!({"email": "a@b.c", "email_verified": false}), None).is_err());
        assert!(parse_tokeninfo(&json!({"email": "a@b.c", "email_verified": true, "aud": "x"}), Some("y")).is_err());
        assert!(parse_tokeninfo(&json!({"email_verified": true}), None).is_err());
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email: "ana@aviva.com.mx".into(),
            display_name: None,
            role: UserRole::Manager,
            organization_id: None,
            product_id: None,
            onboarding: json!({}),
            created_at: Utc::now(),
            last_login_at: None,
        };
        let (token, _) = issue_token("secret", &profile, Duration::hours(1)).unwrap();
        let claims = crate::middleware::auth::decode_claims(&token, "secret").unwrap();
        assert_eq!(claims.sub, profile.id.to_string());
        assert_eq!(claims.role, "manager");
        assert!(crate::middleware::auth::decode_claims(&token, "other").is_err());
    }
}
