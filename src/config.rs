//! Runtime configuration from environment variables (and `.env`, loaded by the binary).

use crate::logic::Retention;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SWEEP_CRON: &str = "0 0 3 * * *";

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("SESSION_KEY must be at least 64 bytes (got {0})")]
    SessionKeyTooShort(usize),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// JSON snapshot of the store. `None` keeps everything in memory only.
    pub data_file: Option<PathBuf>,
    /// Six-field cron expression (with seconds) for the daily sweep.
    pub sweep_cron: String,
    pub retention: Retention,
    /// Signing key for the session cookie. `None` means a random key per process.
    pub session_key: Option<Vec<u8>>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Retention::default();

        let session_key = match get("SESSION_KEY") {
            Some(key) if key.len() < 64 => return Err(ConfigError::SessionKeyTooShort(key.len())),
            Some(key) => Some(key.into_bytes()),
            None => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            data_file: get("DATA_FILE").map(PathBuf::from),
            sweep_cron: get("SWEEP_CRON").unwrap_or_else(|| DEFAULT_SWEEP_CRON.to_string()),
            retention: Retention {
                scrim_days: parse_days(
                    get("SCRIM_RETENTION_DAYS"),
                    "SCRIM_RETENTION_DAYS",
                    defaults.scrim_days,
                )?,
                tournament_days: parse_days(
                    get("TOURNAMENT_RETENTION_DAYS"),
                    "TOURNAMENT_RETENTION_DAYS",
                    defaults.tournament_days,
                )?,
            },
            session_key,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: v }),
    }
}

/// Retention windows must be positive.
fn parse_days(value: Option<String>, var: &'static str, default: i64) -> Result<i64, ConfigError> {
    let days = parse_or(value.clone(), var, default)?;
    if days <= 0 {
        return Err(ConfigError::InvalidValue {
            var,
            value: value.unwrap_or_default(),
        });
    }
    Ok(days)
}
