use thiserror::Error;

use crate::dataset::DatasetError;

/// Failures raised by the rank and recommendation core.
///
/// Everything except `Dataset` is a caller-recoverable input or lookup problem.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("invalid score {score}: {reason}")]
    InvalidScore { score: f64, reason: &'static str },

    #[error("rank must be a positive integer, got {0}")]
    InvalidRank(i64),

    #[error("tier counts must be positive, got ({reach}, {matched}, {safety})")]
    InvalidScheme {
        reach: i64,
        matched: i64,
        safety: i64,
    },

    #[error("invalid percentile {0}: must be within 0-100")]
    InvalidPercentile(f64),

    #[error("no {resource} data for year {year}")]
    DataNotFound { resource: &'static str, year: i32 },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
