//! Score → rank over a cumulative ladder.
//!
//! Rank is read straight from the ladder on an exact hit, otherwise linearly
//! interpolated in cumulative-count space between the nearest known scores on
//! either side. Each population brackets against its own ladder, so a neighbouring
//! score that only the other population has is skipped.

use serde::Serialize;

use super::error::RankError;
use super::score::Score;
use super::table::{DistributionTable, Population};

/// A known point on a ladder used as an interpolation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bracket {
    pub score: Score,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankMethod {
    ExactMatch,
    Interpolated {
        higher: Bracket,
        lower: Bracket,
        fraction: f64,
    },
    /// Above every known score: top rank.
    BoundaryHigh,
    /// Below every known score: bottom rank.
    BoundaryLow,
}

impl RankMethod {
    pub fn describe(&self) -> String {
        match self {
            RankMethod::ExactMatch => "exact match on a recorded score".to_string(),
            RankMethod::Interpolated { higher, lower, .. } => format!(
                "linear interpolation between {} and {}",
                higher.score, lower.score
            ),
            RankMethod::BoundaryHigh => "above the highest recorded score".to_string(),
            RankMethod::BoundaryLow => "below the lowest recorded score".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankEstimate {
    pub rank: u64,
    pub method: RankMethod,
}

/// Ranks `score` within one population of a loaded year.
pub fn rank_in(
    table: &DistributionTable,
    score: Score,
    population: Population,
) -> Result<RankEstimate, RankError> {
    let ladder = table.ladder(population);
    let total = ladder.total();
    if total == 0 {
        return Err(RankError::DataNotFound {
            resource: population.as_str(),
            year: table.year(),
        });
    }

    // The stored cumulative count already is the rank.
    if let Some(count) = table.count_at(score, population) {
        return Ok(RankEstimate {
            rank: count.clamp(1, total),
            method: RankMethod::ExactMatch,
        });
    }

    let (higher, lower) = match (ladder.above(score), ladder.below(score)) {
        (None, _) => {
            return Ok(RankEstimate {
                rank: 1,
                method: RankMethod::BoundaryHigh,
            })
        }
        (_, None) => {
            return Ok(RankEstimate {
                rank: total,
                method: RankMethod::BoundaryLow,
            })
        }
        (Some((hs, hc)), Some((ls, lc))) => (
            Bracket {
                score: hs,
                count: hc,
            },
            Bracket {
                score: ls,
                count: lc,
            },
        ),
    };

    let fraction = (score.cents() - higher.score.cents()) as f64
        / (lower.score.cents() - higher.score.cents()) as f64;
    let interpolated =
        higher.count as f64 + fraction * (lower.count as f64 - higher.count as f64);
    // f64::round is half-away-from-zero; the value is positive here.
    let rank = (interpolated.round().max(1.0) as u64).clamp(1, total);

    Ok(RankEstimate {
        rank,
        method: RankMethod::Interpolated {
            higher,
            lower,
            fraction,
        },
    })
}
