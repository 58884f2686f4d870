//! Reach / match / safety partitioning by admission-rank ratio.
//!
//! `ratio = admission_rank / candidate_rank`. A small ratio means the institution
//! admits only candidates ranked well ahead of this one. Windows are half-open
//! `(above, up_to]` percentages and are compared in integer arithmetic, so an
//! edge such as exactly 95% lands in the window it closes.

use serde::{Deserialize, Serialize};

use super::table::RankedInstitution;
use crate::ranking::RankError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioWindow {
    /// Exclusive lower bound, in percent.
    pub above_pct: u32,
    /// Inclusive upper bound, in percent.
    pub up_to_pct: u32,
}

impl RatioWindow {
    pub const fn new(above_pct: u32, up_to_pct: u32) -> Self {
        Self {
            above_pct,
            up_to_pct,
        }
    }

    pub fn contains(&self, admission_rank: u64, rank: u64) -> bool {
        let scaled = u128::from(admission_rank) * 100;
        let rank = u128::from(rank);
        u128::from(self.above_pct) * rank < scaled && scaled <= u128::from(self.up_to_pct) * rank
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWindows {
    pub reach: RatioWindow,
    pub matched: RatioWindow,
    pub safety: RatioWindow,
}

// Empirical thresholds carried over from past admission seasons. Not validated
// for other rank scales.
pub const PRIMARY_WINDOWS: TierWindows = TierWindows {
    reach: RatioWindow::new(75, 95),
    matched: RatioWindow::new(95, 115),
    safety: RatioWindow::new(115, 140),
};

pub const BACKFILL_WINDOWS: TierWindows = TierWindows {
    reach: RatioWindow::new(70, 95),
    matched: RatioWindow::new(90, 120),
    safety: RatioWindow::new(110, 160),
};

/// Requested bucket sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierScheme {
    pub reach: usize,
    #[serde(rename = "match")]
    pub matched: usize,
    pub safety: usize,
}

impl TierScheme {
    pub fn new(reach: i64, matched: i64, safety: i64) -> Result<Self, RankError> {
        if reach <= 0 || matched <= 0 || safety <= 0 {
            return Err(RankError::InvalidScheme {
                reach,
                matched,
                safety,
            });
        }
        Ok(Self {
            reach: reach as usize,
            matched: matched as usize,
            safety: safety as usize,
        })
    }
}

impl Default for TierScheme {
    fn default() -> Self {
        Self {
            reach: 5,
            matched: 6,
            safety: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Reach,
    Match,
    Safety,
}

/// Indices into the institution slice, per bucket, in ascending admission-rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub reach: Vec<usize>,
    pub matched: Vec<usize>,
    pub safety: Vec<usize>,
}

impl Partition {
    fn bucket(&mut self, tier: Tier) -> &mut Vec<usize> {
        match tier {
            Tier::Reach => &mut self.reach,
            Tier::Match => &mut self.matched,
            Tier::Safety => &mut self.safety,
        }
    }

    pub fn total(&self) -> usize {
        self.reach.len() + self.matched.len() + self.safety.len()
    }
}

/// Buckets `institutions` (already sorted by admission rank) relative to `rank`.
pub fn partition(
    institutions: &[RankedInstitution],
    rank: u64,
    scheme: TierScheme,
    primary: &TierWindows,
    backfill: &TierWindows,
) -> Partition {
    let wanted = |tier: Tier| match tier {
        Tier::Reach => scheme.reach,
        Tier::Match => scheme.matched,
        Tier::Safety => scheme.safety,
    };
    let mut out = Partition::default();
    let mut used = vec![false; institutions.len()];

    for (idx, inst) in institutions.iter().enumerate() {
        let tier = if primary.reach.contains(inst.admission_rank, rank) {
            Some(Tier::Reach)
        } else if primary.matched.contains(inst.admission_rank, rank) {
            Some(Tier::Match)
        } else if primary.safety.contains(inst.admission_rank, rank) {
            Some(Tier::Safety)
        } else {
            None
        };

        if let Some(tier) = tier {
            let bucket = out.bucket(tier);
            if bucket.len() < wanted(tier) {
                bucket.push(idx);
                used[idx] = true;
            }
        }

        if out.reach.len() == scheme.reach
            && out.matched.len() == scheme.matched
            && out.safety.len() == scheme.safety
        {
            break;
        }
    }

    for (tier, window) in [
        (Tier::Reach, backfill.reach),
        (Tier::Match, backfill.matched),
        (Tier::Safety, backfill.safety),
    ] {
        let missing = wanted(tier).saturating_sub(out.bucket(tier).len());
        if missing == 0 {
            continue;
        }
        let picks: Vec<usize> = institutions
            .iter()
            .enumerate()
            .filter(|(idx, inst)| !used[*idx] && window.contains(inst.admission_rank, rank))
            .map(|(idx, _)| idx)
            .take(missing)
            .collect();
        for idx in picks {
            used[idx] = true;
            out.bucket(tier).push(idx);
        }
    }

    // Backfilled entries can sit before primary ones in admission-rank order.
    for tier in [Tier::Reach, Tier::Match, Tier::Safety] {
        out.bucket(tier).sort_unstable();
    }
    out
}
