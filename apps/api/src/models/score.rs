use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of a year's score table.
///
/// Both counts are cumulative: the number of candidates in that population who
/// scored at or above `score`. A count of zero (or less) means the population has
/// no figure at this score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScoreCountRecord {
    pub year: i32,
    pub score: f64,
    #[serde(default)]
    pub count_wide: i64,
    #[serde(default)]
    pub count_narrow: i64,
}
