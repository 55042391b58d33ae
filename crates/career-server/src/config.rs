use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use career_advisor::client::OPENAI_BASE_URL;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub llm_base_url: String,
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("CAREER_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CAREER_JWT_SECRET is unset or still a placeholder");
        }

        let openai_api_key = lookup("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set");
        }

        let port: u16 = lookup("CAREER_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("CAREER_PORT is not a valid port")?;

        let timeout_secs: u64 = lookup("CAREER_LLM_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("CAREER_LLM_TIMEOUT_SECS is not a number")?;
        if timeout_secs == 0 {
            bail!("CAREER_LLM_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            host: lookup("CAREER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("CAREER_DB_PATH").unwrap_or_else(|| "career.db".into()).into(),
            jwt_secret,
            openai_api_key,
            llm_base_url: lookup("CAREER_LLM_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.into()),
            llm_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
