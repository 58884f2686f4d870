use serde::Serialize;

use super::partition::{partition, TierScheme, BACKFILL_WINDOWS, PRIMARY_WINDOWS};
use super::table::InstitutionTable;
use crate::catalog::Catalog;
use crate::models::InstitutionRecord;
use crate::ranking::RankError;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    pub rank: u64,
    pub year: i32,
    pub scheme: TierScheme,
    pub reach: Vec<InstitutionRecord>,
    #[serde(rename = "match")]
    pub matched: Vec<InstitutionRecord>,
    pub safety: Vec<InstitutionRecord>,
    pub total_schools: usize,
}

/// Recommends institutions for a candidate at `rank` using `year`'s admissions.
///
/// Input is validated before any data is touched. An unknown year is
/// `DataNotFound`; a known year with no usable institutions gives empty buckets.
pub async fn recommend(
    catalog: &Catalog,
    rank: i64,
    year: i32,
    counts: (i64, i64, i64),
) -> Result<RecommendationResult, RankError> {
    if rank <= 0 {
        return Err(RankError::InvalidRank(rank));
    }
    let scheme = TierScheme::new(counts.0, counts.1, counts.2)?;
    let table = catalog.institutions(year).await?;
    Ok(build(&table, rank as u64, scheme))
}

fn build(table: &InstitutionTable, rank: u64, scheme: TierScheme) -> RecommendationResult {
    let entries = table.entries();
    let p = partition(entries, rank, scheme, &PRIMARY_WINDOWS, &BACKFILL_WINDOWS);
    let pick = |idxs: &[usize]| -> Vec<InstitutionRecord> {
        idxs.iter().map(|i| entries[*i].record.clone()).collect()
    };

    RecommendationResult {
        rank,
        year: table.year(),
        scheme,
        reach: pick(&p.reach),
        matched: pick(&p.matched),
        safety: pick(&p.safety),
        total_schools: p.total(),
    }
}
