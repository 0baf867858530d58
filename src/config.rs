use std::env;

use anyhow::{Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub session_secret: String,
    pub session_issuer: String,
    pub session_audience: String,
    pub session_expiry_minutes: i64,
    pub session_cookie_secure: bool,
    pub session_cookie_domain: Option<String>,
    pub cors_allowed_origin: Option<String>,
    pub gate_redirect_anonymous: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        let session_issuer = env::var("SESSION_ISSUER").unwrap_or_else(|_| "lawdesk".to_string());
        let session_audience =
            env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "lawdesk-web".to_string());
        let session_expiry_minutes = env::var("SESSION_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "720".to_string())
            .parse()
            .context("SESSION_EXPIRY_MINUTES must be an integer")?;
        let session_cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let session_cookie_domain = env::var("SESSION_COOKIE_DOMAIN").ok();
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let gate_redirect_anonymous = env::var("GATE_REDIRECT_ANONYMOUS")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            session_secret,
            session_issuer,
            session_audience,
            session_expiry_minutes,
            session_cookie_secure,
            session_cookie_domain,
            cors_allowed_origin,
            gate_redirect_anonymous,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_password(Some("*****"));
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_flag, redact_database_url};

    #[test]
    fn redacts_password_in_database_url() {
        let redacted = redact_database_url("postgres://lawdesk:hunter2@db:5432/practice");
        assert!(redacted.contains("postgres://lawdesk:*****@"));
        assert!(!redacted.contains("hunter2"));
    }

    #[test]
    fn falls_back_when_parse_fails() {
        assert_eq!(redact_database_url("not a url"), "***");
    }

    #[test]
    fn flags_accept_one_and_true() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("yes"));
    }
}
