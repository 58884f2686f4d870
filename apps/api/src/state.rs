use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Per-year score and institution tables, loaded lazily from the dataset.
    pub catalog: Arc<Catalog>,
    pub config: Config,
}
