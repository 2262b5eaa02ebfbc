//! Configuration for the user feature
//!
//! Values come from the environment:
//!
//! | Variable | Default |
//! |---|---|
//! | `ROSTER_API_URL` | `http://localhost:3001` |
//! | `ROSTER_ID_STRATEGY` | `max-plus-one` |
//! | `ROSTER_REQUEST_TIMEOUT_SECS` | `10` |
//! | `ROSTER_HISTORY_LIMIT` | `25` (at most 10000) |

use roster_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Largest accepted `ROSTER_HISTORY_LIMIT`
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable could not be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },

    /// The API URL is not an http(s) URL
    #[error("api base url must start with http:// or https://, got {0:?}")]
    InvalidApiUrl(String),

    /// A zero request timeout would fail every request
    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    /// The history limit exceeds [`MAX_HISTORY_LIMIT`]
    #[error("history limit {0} exceeds the maximum of {max}", max = MAX_HISTORY_LIMIT)]
    HistoryLimitTooLarge(usize),
}

/// How a new user gets its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// Read the collection, use `max(id) + 1`, then write
    ///
    /// Two concurrent creations can pick the same identifier.
    #[default]
    MaxPlusOne,
    /// `MaxPlusOne`, with creations from this process run one at a time
    Serialized,
    /// Send the draft without an identifier and keep the server's answer
    ServerAssigned,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaxPlusOne => "max-plus-one",
            Self::Serialized => "serialized",
            Self::ServerAssigned => "server-assigned",
        })
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max-plus-one" => Ok(Self::MaxPlusOne),
            "serialized" => Ok(Self::Serialized),
            "server-assigned" => Ok(Self::ServerAssigned),
            other => Err(format!(
                "unknown strategy {other:?} (expected max-plus-one, serialized or server-assigned)"
            )),
        }
    }
}

/// Settings for the user feature and its store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersConfig {
    /// Root of the user service
    pub api_base_url: String,
    /// Identifier assignment on create
    pub id_strategy: IdStrategy,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Applied actions kept in the store history
    pub history_limit: usize,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            id_strategy: IdStrategy::default(),
            request_timeout_secs: 10,
            history_limit: 25,
        }
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

impl UsersConfig {
    /// Load from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: lookup("ROSTER_API_URL").unwrap_or(defaults.api_base_url),
            id_strategy: parse("ROSTER_ID_STRATEGY", lookup("ROSTER_ID_STRATEGY"), defaults.id_strategy)?,
            request_timeout_secs: parse(
                "ROSTER_REQUEST_TIMEOUT_SECS",
                lookup("ROSTER_REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            history_limit: parse(
                "ROSTER_HISTORY_LIMIT",
                lookup("ROSTER_HISTORY_LIMIT"),
                defaults.history_limit,
            )?,
        })
    }

    /// Check values that parse but cannot work
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidApiUrl`]: the URL is not http(s)
    /// - [`ConfigError::ZeroTimeout`]: the request timeout is zero
    /// - [`ConfigError::HistoryLimitTooLarge`]: the history limit is above [`MAX_HISTORY_LIMIT`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_base_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::HistoryLimitTooLarge(self.history_limit));
        }
        Ok(())
    }

    /// Per-request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Store settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_history_limit(self.history_limit)
    }
}
