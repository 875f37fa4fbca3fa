use chrono::Duration;
use thiserror::Error;

const DEFAULT_MAGIC_LINK_TTL_MINUTES: i64 = 60;

/// Application settings read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub invite_code: String,
    pub admin_emails: Vec<String>,
    pub site_url: String,
    pub mail_webhook_url: Option<String>,
    pub magic_link_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{0} has an invalid value")]
    Invalid(&'static str),
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let ttl_minutes = match lookup("MAGIC_LINK_TTL_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or(ConfigError::Invalid("MAGIC_LINK_TTL_MINUTES"))?,
            None => DEFAULT_MAGIC_LINK_TTL_MINUTES,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            invite_code: required("INVITE_CODE")?,
            admin_emails: parse_admin_emails(&lookup("ADMIN_EMAILS").unwrap_or_default()),
            site_url: required("SITE_URL")?.trim_end_matches('/').to_string(),
            mail_webhook_url: lookup("MAIL_WEBHOOK_URL").filter(|v| !v.trim().is_empty()),
            magic_link_ttl: Duration::minutes(ttl_minutes),
        })
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

/// Splits a comma separated list, trimming, lowercasing and dropping empties.
pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
