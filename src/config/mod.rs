use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub geoip: GeoIpConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// Path to a GeoLite2/GeoIP2 Country or City .mmdb file
    pub country_db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Blocking enrichment workers; 1 runs sequentially
    pub workers: usize,
    /// Countries with fewer peers are reported as "other"
    pub other_threshold: u64,
}

impl DatabaseConfig {
    const fn default_max_connections() -> u32 {
        5
    }
}

impl PipelineConfig {
    const fn default_workers() -> usize {
        1
    }

    const fn default_other_threshold() -> u64 {
        20
    }
}

impl DatabaseBackend {
    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = DatabaseBackend::from_name(
            &std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
        );

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./peers.db".to_string());

        let max_connections = env_or(
            "DATABASE_MAX_CONNECTIONS",
            DatabaseConfig::default_max_connections(),
        )?;

        let country_db_path = std::env::var("GEOIP_COUNTRY_DB")
            .unwrap_or_else(|_| "GeoLite2/GeoLite2-Country.mmdb".to_string());

        let workers = env_or("PIPELINE_WORKERS", PipelineConfig::default_workers())?;

        let other_threshold = env_or(
            "REPORT_OTHER_THRESHOLD",
            PipelineConfig::default_other_threshold(),
        )?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            geoip: GeoIpConfig { country_db_path },
            pipeline: PipelineConfig {
                workers,
                other_threshold,
            },
        })
    }
}

/// Read a numeric variable, falling back to `default` only when it is unset
fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} must be a non-negative integer, got '{v}'")),
        Err(_) => Ok(default),
    }
}
