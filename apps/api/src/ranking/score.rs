use std::fmt;

use serde::{Serialize, Serializer};

use super::error::RankError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 800.0;

/// Distance from a whole number of cents still treated as representation error.
const CENT_TOLERANCE: f64 = 1e-6;

/// An exam score with at most two decimal digits, held as integer cents.
///
/// Ordering, equality and hashing all work on the cents value, so `750.25` read
/// from a float that came out as `750.2500000001` is the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i64);

impl Score {
    /// Validates a caller-supplied score: finite, within 0-800, two decimals at most.
    pub fn parse(value: f64) -> Result<Self, RankError> {
        if !value.is_finite() {
            return Err(RankError::InvalidScore {
                score: value,
                reason: "score must be a finite number",
            });
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(RankError::InvalidScore {
                score: value,
                reason: "score must be between 0 and 800",
            });
        }
        let scaled = value * 100.0;
        let cents = scaled.round();
        if (scaled - cents).abs() > CENT_TOLERANCE {
            return Err(RankError::InvalidScore {
                score: value,
                reason: "score supports at most two decimal places",
            });
        }
        Ok(Score(cents as i64))
    }

    pub const fn from_cents(cents: i64) -> Self {
        Score(cents)
    }

    pub const fn from_points(points: i64) -> Self {
        Score(points * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The whole-point score at or below this one (`760.5` → `760`).
    pub fn floor(self) -> Self {
        Score(self.0.div_euclid(100) * 100)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (points, cents) = (abs / 100, abs % 100);
        if cents == 0 {
            write!(f, "{sign}{points}")
        } else if cents % 10 == 0 {
            write!(f, "{sign}{points}.{}", cents / 10)
        } else {
            write!(f, "{sign}{points}.{cents:02}")
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
