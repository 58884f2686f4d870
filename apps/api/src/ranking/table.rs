use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use super::error::RankError;
use super::score::Score;
use crate::dataset::DatasetError;
use crate::models::ScoreCountRecord;

/// The two candidate pools ranked against the same exam.
/// `Narrow` is a subset of `Wide` with its own cumulative ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    Wide,
    Narrow,
}

impl Population {
    pub fn as_str(self) -> &'static str {
        match self {
            Population::Wide => "wide",
            Population::Narrow => "narrow",
        }
    }
}

/// One population's score → cumulative count map.
#[derive(Debug, Clone, Default)]
pub struct Ladder {
    counts: BTreeMap<Score, u64>,
    total: u64,
}

impl Ladder {
    pub fn exact(&self, score: Score) -> Option<u64> {
        self.counts.get(&score).copied()
    }

    /// Nearest known score strictly above `score`.
    pub fn above(&self, score: Score) -> Option<(Score, u64)> {
        self.counts
            .range((Bound::Excluded(score), Bound::Unbounded))
            .next()
            .map(|(s, c)| (*s, *c))
    }

    /// Nearest known score strictly below `score`.
    pub fn below(&self, score: Score) -> Option<(Score, u64)> {
        self.counts
            .range(..score)
            .next_back()
            .map(|(s, c)| (*s, *c))
    }

    /// Candidates scoring at or above `score`: the count at the lowest known score
    /// that is still `>= score`, or zero above the top of the ladder.
    pub fn at_or_above(&self, score: Score) -> u64 {
        self.counts.range(score..).next().map_or(0, |(_, c)| *c)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Highest-to-lowest iteration.
    pub fn iter_desc(&self) -> impl Iterator<Item = (Score, u64)> + '_ {
        self.counts.iter().rev().map(|(s, c)| (*s, *c))
    }

    fn insert(&mut self, score: Score, count: u64) {
        self.counts.insert(score, count);
        self.total = self.total.max(count);
    }
}

/// One year's cumulative score distribution for both populations.
#[derive(Debug, Clone)]
pub struct DistributionTable {
    year: i32,
    scores: Vec<Score>,
    wide: Ladder,
    narrow: Ladder,
}

impl DistributionTable {
    /// Builds the whole table from raw rows; nothing is published half-built.
    pub fn from_records(year: i32, records: &[ScoreCountRecord]) -> Result<Self, RankError> {
        if records.is_empty() {
            return Err(RankError::DataNotFound {
                resource: "score",
                year,
            });
        }

        let mut wide = Ladder::default();
        let mut narrow = Ladder::default();
        let mut scores = BTreeSet::new();

        for record in records {
            let score = Score::parse(record.score).map_err(|e| DatasetError::Malformed {
                year,
                message: e.to_string(),
            })?;
            if record.count_wide > 0 {
                wide.insert(score, record.count_wide as u64);
                scores.insert(score);
            }
            if record.count_narrow > 0 {
                narrow.insert(score, record.count_narrow as u64);
                scores.insert(score);
            }
        }

        check_non_increasing(year, Population::Wide, &wide)?;
        check_non_increasing(year, Population::Narrow, &narrow)?;

        Ok(Self {
            year,
            scores: scores.into_iter().rev().collect(),
            wide,
            narrow,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Every score that carries data for either population, highest first.
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn ladder(&self, population: Population) -> &Ladder {
        match population {
            Population::Wide => &self.wide,
            Population::Narrow => &self.narrow,
        }
    }

    pub fn total(&self, population: Population) -> u64 {
        self.ladder(population).total()
    }

    pub fn count_at(&self, score: Score, population: Population) -> Option<u64> {
        self.ladder(population).exact(score)
    }

    /// Candidates whose whole-point score equals `floor(score)`.
    pub fn segment_count(&self, score: Score, population: Population) -> u64 {
        let ladder = self.ladder(population);
        let floor = score.floor();
        let next = Score::from_cents(floor.cents() + 100);
        ladder
            .at_or_above(floor)
            .saturating_sub(ladder.at_or_above(next))
    }

    /// Candidates with `low <= score < high`.
    pub fn count_between(&self, low: Score, high: Score, population: Population) -> u64 {
        let ladder = self.ladder(population);
        ladder
            .at_or_above(low)
            .saturating_sub(ladder.at_or_above(high))
    }

    /// Highest score whose cumulative count reaches the rank at percentile `p`.
    pub fn score_at_percentile(
        &self,
        percentile: f64,
        population: Population,
    ) -> Result<Option<Score>, RankError> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(RankError::InvalidPercentile(percentile));
        }
        let ladder = self.ladder(population);
        if ladder.total() == 0 {
            return Ok(None);
        }
        let target = (ladder.total() as f64 * (1.0 - percentile / 100.0)).floor() as u64;
        Ok(ladder
            .iter_desc()
            .find(|(_, count)| *count >= target)
            .map(|(score, _)| score))
    }
}

fn check_non_increasing(
    year: i32,
    population: Population,
    ladder: &Ladder,
) -> Result<(), RankError> {
    let mut previous: Option<(Score, u64)> = None;
    for (score, count) in ladder.iter_desc() {
        if let Some((higher, higher_count)) = previous {
            if count < higher_count {
                return Err(DatasetError::Malformed {
                    year,
                    message: format!(
                        "{} count drops from {higher_count} at {higher} to {count} at {score}",
                        population.as_str()
                    ),
                }
                .into());
            }
        }
        previous = Some((score, count));
    }
    Ok(())
}
