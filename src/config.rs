use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_USERS_DATABASE: &str = "basic-node-server";
const DEFAULT_PRODUCTS_DATABASE: &str = "pocket-tech";
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub users_database: String,
    pub products_database: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let token_ttl = match lookup("EXPIRES_IN") {
            Some(raw) => parse_ttl(&raw).map_err(|reason| ConfigError::Invalid {
                key: "EXPIRES_IN",
                reason,
            })?,
            None => DEFAULT_TOKEN_TTL,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            mongodb_uri: required("MONGODB_URI")?,
            users_database: lookup("USERS_DATABASE")
                .unwrap_or_else(|| DEFAULT_USERS_DATABASE.to_string()),
            products_database: lookup("PRODUCTS_DATABASE")
                .unwrap_or_else(|| DEFAULT_PRODUCTS_DATABASE.to_string()),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl,
        })
    }
}

/// Accepts humantime forms (`30m`, `7d`, `1h 30m`) or a bare number of seconds.
fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let ttl = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(raw).map_err(|e| e.to_string())?,
    };
    if ttl.is_zero() {
        return Err("token lifetime must be positive".to_string());
    }
    if ttl > MAX_TOKEN_TTL {
        return Err(format!(
            "token lifetime may not exceed {}",
            humantime::format_duration(MAX_TOKEN_TTL)
        ));
    }
    Ok(ttl)
}
