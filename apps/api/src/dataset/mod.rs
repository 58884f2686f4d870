//! Dataset providers: the read-only source of score tables and institution tables.
//!
//! `Catalog` holds an `Arc<dyn Dataset>`, chosen at startup from config:
//! `PgDataset` when a database URL is configured, `StaticDataset` for a JSON file.

pub mod postgres;
pub mod static_file;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{InstitutionRecord, ScoreCountRecord};

pub use postgres::PgDataset;
pub use static_file::StaticDataset;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed record in {year}: {message}")]
    Malformed { year: i32, message: String },
}

/// Year-keyed access to the raw records.
///
/// `None` means the provider does not know the year at all. A known year with no
/// rows of the requested kind is `Some(vec![])`; callers rely on that distinction.
#[async_trait]
pub trait Dataset: Send + Sync {
    async fn score_records(&self, year: i32)
        -> Result<Option<Vec<ScoreCountRecord>>, DatasetError>;

    async fn institutions(&self, year: i32)
        -> Result<Option<Vec<InstitutionRecord>>, DatasetError>;

    /// Every known year, ascending.
    async fn years(&self) -> Result<Vec<i32>, DatasetError>;
}
