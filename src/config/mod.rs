// src/config/mod.rs
// Selection and session settings, loaded from .env / environment or a TOML file

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::{Level, debug, warn};

use crate::error::{Result, RotorError};

pub const DEFAULT_SESSIONS_LIMIT: usize = 1000;
pub const DEFAULT_SESSION_STALE_TIMEOUT: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RotorConfig {
    // ── Selection
    /// Always return the first candidate. Used by tests and demo recordings.
    pub disable_random: bool,

    // ── Session Configuration
    pub sessions_limit: usize,
    /// Minutes without a touch before a session counts as stale
    pub session_stale_timeout: i64,

    // ── Logging Configuration
    pub log_level: String,
}

impl Default for RotorConfig {
    fn default() -> Self {
        Self {
            disable_random: false,
            sessions_limit: DEFAULT_SESSIONS_LIMIT,
            session_stale_timeout: DEFAULT_SESSION_STALE_TIMEOUT,
            log_level: "info".to_string(),
        }
    }
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    debug!("Config: {} = {} (from environment)", key, clean_val);
                    parsed
                }
                Err(_) => {
                    warn!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

impl RotorConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            debug!(".env file not found, using environment variables and defaults");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, test maps).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut config = Self {
            disable_random: env_var_or(&lookup, "ROTOR_DISABLE_RANDOM", defaults.disable_random),
            sessions_limit: env_var_or(&lookup, "ROTOR_SESSIONS_LIMIT", defaults.sessions_limit),
            session_stale_timeout: env_var_or(
                &lookup,
                "ROTOR_SESSION_STALE_TIMEOUT",
                defaults.session_stale_timeout,
            ),
            log_level: env_var_or(&lookup, "ROTOR_LOG_LEVEL", defaults.log_level.clone()),
        };

        // Out-of-range values get the same treatment as unparsable ones
        if config.sessions_limit == 0 {
            warn!("Config: ROTOR_SESSIONS_LIMIT = 0 (must be at least 1, using default)");
            config.sessions_limit = defaults.sessions_limit;
        }
        if config.session_stale_timeout <= 0 {
            warn!(
                "Config: ROTOR_SESSION_STALE_TIMEOUT = {} (must be positive, using default)",
                config.session_stale_timeout
            );
            config.session_stale_timeout = defaults.session_stale_timeout;
        }
        config
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sessions_limit == 0 {
            return Err(RotorError::Config("sessions_limit must be at least 1".into()));
        }
        if self.session_stale_timeout <= 0 {
            return Err(RotorError::Config(
                "session_stale_timeout must be a positive number of minutes".into(),
            ));
        }
        Ok(())
    }

    /// Max tracing level from `log_level`, INFO when it doesn't name a level
    pub fn tracing_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or_else(|_| {
            warn!("Config: log_level = '{}' (unknown level, using info)", self.log_level);
            Level::INFO
        })
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<RotorConfig> = Lazy::new(RotorConfig::from_env);
