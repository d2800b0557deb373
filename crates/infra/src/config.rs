//! Configuration loading and representation.
//!
//! Everything is read from environment variables; unset variables fall back to
//! development defaults.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration of the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// `CATALOG_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `DATABASE_URL`; when unset the in-memory store is used.
    pub database_url: Option<String>,
    /// `CATALOG_DB_MAX_CONNECTIONS`
    pub max_connections: u32,
    /// `CATALOG_STORE_TIMEOUT_MS`; bound on every store call.
    pub store_timeout: Duration,
    /// `CATALOG_DIAGNOSTICS`; include internal error detail in 5xx bodies.
    pub diagnostics: bool,
    /// `CATALOG_SEED_DEMO`; seed the in-memory store with demo data.
    pub seed_demo: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            diagnostics: false,
            seed_demo: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or("CATALOG_BIND_ADDR", get("CATALOG_BIND_ADDR"), DEFAULT_BIND_ADDR)?;
        let max_connections: u32 = parse_or(
            "CATALOG_DB_MAX_CONNECTIONS",
            get("CATALOG_DB_MAX_CONNECTIONS"),
            &DEFAULT_MAX_CONNECTIONS.to_string(),
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_DB_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }
        let timeout_ms: u64 = parse_or(
            "CATALOG_STORE_TIMEOUT_MS",
            get("CATALOG_STORE_TIMEOUT_MS"),
            &DEFAULT_STORE_TIMEOUT_MS.to_string(),
        )?;

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            max_connections,
            store_timeout: Duration::from_millis(timeout_ms),
            diagnostics: parse_flag("CATALOG_DIAGNOSTICS", get("CATALOG_DIAGNOSTICS"), false)?,
            seed_demo: parse_flag("CATALOG_SEED_DEMO", get("CATALOG_SEED_DEMO"), true)?,
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}

fn parse_flag(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                reason: format!("{v:?} is not a boolean"),
            }),
        },
    }
}
