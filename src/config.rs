use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: String,
    pub account_service_url: String,
    pub catalog_service_url: String,
    pub host: String,
    pub port: u16,
    pub collaborator_timeout: Duration,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = parse(&lookup, "PORT", 8083u16)?;
        let timeout_ms = parse(&lookup, "COLLABORATOR_TIMEOUT_MS", 3000u64)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            redis_url: or_default("REDIS_URL", "redis://127.0.0.1:6379"),
            account_service_url: or_default("ACCOUNT_SERVICE_URL", "http://127.0.0.1:8081"),
            catalog_service_url: or_default("CATALOG_SERVICE_URL", "http://127.0.0.1:8082"),
            host: or_default("HOST", "0.0.0.0"),
            port,
            collaborator_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
