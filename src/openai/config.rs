//! Connection settings for the OpenAI API.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::CommitgenError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Environment variable to override the API base URL.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

/// Default timeout for a single HTTP request (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable to override the per-request timeout.
const TIMEOUT_ENV_VAR: &str = "COMMITGEN_REQUEST_TIMEOUT";

/// Resolved connection settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Build a config from an explicit credential, falling back to the environment.
    ///
    /// An explicit, non-empty credential always wins over `OPENAI_API_KEY`.
    pub fn resolve(credential: Option<&str>) -> Result<Self, CommitgenError> {
        let api_key = resolve_api_key(credential).ok_or(CommitgenError::MissingCredential)?;

        Ok(Self {
            api_key,
            base_url: get_base_url(),
            timeout: get_timeout(),
        })
    }
}

fn resolve_api_key(credential: Option<&str>) -> Option<String> {
    if let Some(key) = credential
        && !key.trim().is_empty()
    {
        return Some(key.trim().to_string());
    }

    match env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        _ => None,
    }
}

fn get_base_url() -> String {
    match env::var(BASE_URL_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// Get the configured per-request timeout.
///
/// Logs a warning if the environment variable is set but contains
/// an invalid value (non-numeric, empty, or negative).
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
