//! Client configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured outside of tests.

use std::time::Duration;

use crate::client::TodoClient;

pub const DEFAULT_BASE_URL: &str = "https://todos.simpleapi.dev";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `TODO_API_BASE_URL`, `TODO_API_KEY` and `TODO_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TODO_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("TODO_API_BASE_URL".to_string()));
        }

        let api_key = lookup("TODO_API_KEY").filter(|key| !key.trim().is_empty());

        let timeout = match lookup("TODO_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("TODO_API_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            api_key,
            timeout,
        })
    }

    pub fn todo_client(&self) -> TodoClient {
        let client = TodoClient::new(&self.base_url);
        match &self.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        }
    }
}
