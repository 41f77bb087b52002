//! Client configuration loaded from the environment.

use crate::error::{ClientError, Result};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Connection and polling settings for the practice service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Sent as a bearer token when present.
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(2000),
            poll_timeout: Duration::from_secs(300),
        }
    }
}

impl ClientConfig {
    /// Read `PRACTICE_*` variables, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_url: get("PRACTICE_API_URL").unwrap_or(defaults.api_url),
            api_token: get("PRACTICE_API_TOKEN"),
            request_timeout: match get("PRACTICE_REQUEST_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse("PRACTICE_REQUEST_TIMEOUT_SECS", &v)?),
                None => defaults.request_timeout,
            },
            poll_interval: match get("PRACTICE_POLL_INTERVAL_MS") {
                Some(v) => Duration::from_millis(parse("PRACTICE_POLL_INTERVAL_MS", &v)?),
                None => defaults.poll_interval,
            },
            poll_timeout: match get("PRACTICE_POLL_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse("PRACTICE_POLL_TIMEOUT_SECS", &v)?),
                None => defaults.poll_timeout,
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidConfig {
            key,
            value: value.to_string(),
        })
}
