use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    models::domain::Language,
    services::quiz_generation_service::{DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE},
};

pub const DEFAULT_QUIZ_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub quiz_model: String,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Maximum number of earlier prompts sent as the avoid list. Unset means all.
    pub avoid_topics_limit: Option<usize>,
    pub default_language: Language,
    /// Sessions untouched for this long are evicted.
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: parsed("WEB_SERVER_PORT").unwrap_or(8080),
            openai_api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            openai_api_base: env::var("OPENAI_API_BASE")
                .ok()
                .filter(|base| !base.trim().is_empty()),
            quiz_model: env::var("QUIZ_MODEL").unwrap_or_else(|_| DEFAULT_QUIZ_MODEL.to_string()),
            batch_size: parsed("QUIZ_BATCH_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            batch_delay_ms: parsed("QUIZ_BATCH_DELAY_MS")
                .unwrap_or(DEFAULT_BATCH_DELAY.as_millis() as u64),
            avoid_topics_limit: parsed("QUIZ_AVOID_TOPICS_LIMIT"),
            default_language: parsed("DEFAULT_LANGUAGE").unwrap_or_default(),
            session_ttl_secs: parsed("SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS),
            session_sweep_interval_secs: parsed("SESSION_SWEEP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
        }
    }

    /// Fails when the generator cannot possibly authenticate.
    pub fn validate_for_production(&self) -> AppResult<()> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::InternalError(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        if self.quiz_model.trim().is_empty() {
            return Err(AppError::InternalError("QUIZ_MODEL is empty".to_string()));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        i64::try_from(self.session_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn session_sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_sweep_interval_secs)
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            openai_api_key: SecretString::from("test-api-key".to_string()),
            openai_api_base: Some("http://localhost:9999/v1".to_string()),
            quiz_model: "test-model".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: 0,
            avoid_topics_limit: None,
            default_language: Language::Vi,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            session_sweep_interval_secs: DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        }
    }
}
