//! Environment-driven configuration.

use core::str::FromStr;
use thiserror::Error;

/// How mutating commands treat the caller-supplied expected version.
///
/// Strict is the default: every mutation of an existing product runs the
/// version check. Permissive lets a caller pass version 0 to bypass it —
/// a backwards-compatibility escape hatch that races without protection
/// and should be retired.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    #[default]
    Strict,
    Permissive,
}

impl FromStr for VersionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(VersionPolicy::Strict),
            "permissive" => Ok(VersionPolicy::Permissive),
            other => Err(ConfigError::Invalid {
                key: "PROCAT_VERSION_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub version_policy: VersionPolicy,
}

impl Config {
    /// Read from the environment: `DATABASE_URL` (required),
    /// `PROCAT_MAX_CONNECTIONS` (default 10),
    /// `PROCAT_VERSION_POLICY` (default `strict`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match std::env::var("PROCAT_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PROCAT_MAX_CONNECTIONS",
                value: raw,
            })?,
            Err(_) => 10,
        };

        let version_policy = match std::env::var("PROCAT_VERSION_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => VersionPolicy::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            version_policy,
        })
    }
}
