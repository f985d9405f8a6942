use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Which store backs the listings collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("Invalid STORAGE_BACKEND: {}", other)),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("Invalid LOG_FORMAT: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Request timeout in seconds
    pub request_timeout: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 10,
            request_timeout: 30,
            log_level: "listings_api=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.storage_backend,
        };

        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!(
                "DATABASE_URL environment variable is required when STORAGE_BACKEND=postgres"
            ));
        }

        Ok(Config {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or(&var, "PORT", defaults.port)?,
            storage_backend,
            database_url,
            max_connections: parse_or(&var, "MAX_CONNECTIONS", defaults.max_connections)?,
            request_timeout: parse_or(&var, "REQUEST_TIMEOUT", defaults.request_timeout)?,
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: match var("LOG_FORMAT") {
                Some(value) => value.parse()?,
                None => defaults.log_format,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}
