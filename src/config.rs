use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub results_signing_secret: String,
    pub identity_tokeninfo_url: String,
    pub identity_audience: Option<String>,
    pub allowed_email_domains: Vec<String>,
    pub allowed_emails: Vec<String>,
    pub admin_emails: Vec<String>,
    pub cors_origins: Vec<String>,
    pub admin_rps: u32,
    pub public_rps: u32,
    pub play_session_ttl_minutes: i64,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080"),
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 12)?,
            results_signing_secret: get_env("RESULTS_SIGNING_SECRET")?,
            identity_tokeninfo_url: get_env_or(
                "IDENTITY_TOKENINFO_URL",
                "https://oauth2.googleapis.com/tokeninfo",
            ),
            identity_audience: env::var("IDENTITY_AUDIENCE").ok().filter(|v| !v.is_empty()),
            allowed_email_domains: get_env_list("ALLOWED_EMAIL_DOMAINS"),
            allowed_emails: get_env_list("ALLOWED_EMAILS"),
            admin_emails: get_env_list("ADMIN_EMAILS"),
            cors_origins: get_env_list("CORS_ORIGINS"),
            admin_rps: get_env_parse_or("ADMIN_RPS", 50)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 100)?,
            play_session_ttl_minutes: get_env_parse_or("PLAY_SESSION_TTL_MINUTES", 120)?,
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Comma separated, lower-cased, blanks dropped.
fn get_env_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_normalizes_entries() {
        let list = split_list(" Aviva.com.mx, ,partner.MX ");
        assert_eq!(list, vec!["aviva.com.mx".to_string(), "partner.mx".to_string()]);
    }

    #[test]
    fn split_list_of_blank_is_empty() {
        assert!(split_list("  ").is_empty());
    }
}
