// Rank engine: score validation, per-year cumulative tables, interpolation,
// percentile analysis. Everything below `service` is pure and never logs.

pub mod analysis;
pub mod error;
pub mod handlers;
pub mod interpolate;
pub mod score;
pub mod service;
pub mod table;

pub use error::RankError;
pub use table::DistributionTable;
