//! Catalog: per-year tables behind a lazy, explicitly invalidated cache.
//!
//! Owns the dataset provider and one `YearCache` per table kind. Shared through
//! `AppState` as an `Arc<Catalog>`; nothing here is global.

pub mod cache;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::ranking::{DistributionTable, RankError};
use crate::recommend::InstitutionTable;

pub use cache::YearCache;

pub struct Catalog {
    dataset: Arc<dyn Dataset>,
    distributions: YearCache<DistributionTable>,
    institutions: YearCache<InstitutionTable>,
}

impl Catalog {
    pub fn new(dataset: Arc<dyn Dataset>) -> Self {
        Self {
            dataset,
            distributions: YearCache::new(),
            institutions: YearCache::new(),
        }
    }

    /// The year's score distribution, loading it on first use.
    pub async fn distribution(&self, year: i32) -> Result<Arc<DistributionTable>, RankError> {
        self.distributions
            .get_or_load(year, || async move {
                let records = self
                    .dataset
                    .score_records(year)
                    .await?
                    .ok_or(RankError::DataNotFound {
                        resource: "score",
                        year,
                    })?;
                let table = DistributionTable::from_records(year, &records)?;
                info!(
                    "Loaded score distribution for {year}: {} score levels",
                    table.scores().len()
                );
                Ok::<_, RankError>(table)
            })
            .await
    }

    /// The year's institutions. Unknown year is an error; a known year without
    /// institutions yields an empty table.
    pub async fn institutions(&self, year: i32) -> Result<Arc<InstitutionTable>, RankError> {
        self.institutions
            .get_or_load(year, || async move {
                let records = self
                    .dataset
                    .institutions(year)
                    .await?
                    .ok_or(RankError::DataNotFound {
                        resource: "institution",
                        year,
                    })?;
                let raw = records.len();
                let table = InstitutionTable::from_records(year, records);
                if table.is_empty() {
                    warn!("No institutions with an admission rank for {year} ({raw} records)");
                } else {
                    info!(
                        "Loaded institutions for {year}: {} usable of {raw}",
                        table.len()
                    );
                }
                Ok::<_, RankError>(table)
            })
            .await
    }

    pub async fn years(&self) -> Result<Vec<i32>, RankError> {
        Ok(self.dataset.years().await?)
    }

    /// Drops every cached table.
    pub async fn invalidate(&self) {
        let dropped =
            self.distributions.invalidate().await + self.institutions.invalidate().await;
        info!("Catalog cache cleared ({dropped} tables dropped)");
    }

    pub async fn invalidate_year(&self, year: i32) {
        let a = self.distributions.invalidate_year(year).await;
        let b = self.institutions.invalidate_year(year).await;
        debug!("Invalidated {year} (distribution: {a}, institutions: {b})");
    }
}
