use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Where score and institution tables come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    Postgres { database_url: String },
    File { path: PathBuf },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but invalid, or no dataset is configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub dataset: DatasetSource,
    pub default_year: i32,
    pub port: u16,
    pub db_max_connections: u32,
    pub rust_log: String,
    pub warm_cache: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dataset = match (get("DATASET_PATH"), get("DATABASE_URL")) {
            (Some(path), _) => DatasetSource::File {
                path: PathBuf::from(path),
            },
            (None, Some(database_url)) => DatasetSource::Postgres { database_url },
            (None, None) => bail!("Either DATASET_PATH or DATABASE_URL must be set"),
        };

        Ok(Config {
            dataset,
            default_year: get("DEFAULT_YEAR")
                .unwrap_or_else(|| "2024".to_string())
                .parse::<i32>()
                .context("DEFAULT_YEAR must be a valid year")?,
            port: get("PORT")
                .unwrap_or_else(|| "8008".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            warm_cache: get("WARM_CACHE")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .context("WARM_CACHE must be true or false")?,
        })
    }
}
