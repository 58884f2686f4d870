use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InstitutionRecord {
    pub year: i32,
    pub name: String,
    /// Narrow-population cumulative rank at which this year's cutoff fell.
    pub admission_rank: Option<i64>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub admission_score: Option<f64>,
}

impl InstitutionRecord {
    /// Admission rank as a usable difficulty figure; `None` when missing or non-positive.
    pub fn effective_rank(&self) -> Option<u64> {
        self.admission_rank.filter(|r| *r > 0).map(|r| r as u64)
    }
}
