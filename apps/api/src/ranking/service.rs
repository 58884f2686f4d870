use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::analysis::{analyze, report, AnalysisReport};
use super::error::RankError;
use super::interpolate::{rank_in, RankEstimate, RankMethod};
use super::score::Score;
use super::table::{DistributionTable, Population};
use crate::catalog::Catalog;

#[derive(Debug, Clone, Serialize)]
pub struct RankRange {
    pub start: u64,
    pub end: u64,
}

/// Full answer for one `(score, year)` query across both populations.
#[derive(Debug, Clone, Serialize)]
pub struct RankQueryResult {
    pub score: Score,
    pub year: i32,
    pub rank_wide: u64,
    pub rank_narrow: u64,
    pub total_wide: u64,
    pub total_narrow: u64,
    pub percentage_wide: f64,
    pub percentile_wide: f64,
    pub percentage_narrow: f64,
    pub percentile_narrow: f64,
    pub method: RankMethod,
    pub method_narrow: RankMethod,
    pub calculation_method: String,
    pub rank_range: RankRange,
    pub segment_count: u64,
    pub analysis: AnalysisReport,
    pub generated_at: DateTime<Utc>,
}

/// Rank one score within one population for a year.
pub async fn rank(
    catalog: &Catalog,
    score: f64,
    year: i32,
    population: Population,
) -> Result<RankEstimate, RankError> {
    let score = Score::parse(score)?;
    let table = catalog.distribution(year).await?;
    rank_in(&table, score, population)
}

pub async fn query_rank(
    catalog: &Catalog,
    score: f64,
    year: i32,
) -> Result<RankQueryResult, RankError> {
    let score = Score::parse(score)?;
    let table = catalog.distribution(year).await?;
    evaluate(&table, score)
}

fn evaluate(table: &DistributionTable, score: Score) -> Result<RankQueryResult, RankError> {
    let wide = rank_in(table, score, Population::Wide)?;
    let narrow = rank_in(table, score, Population::Narrow)?;
    let total_wide = table.total(Population::Wide);
    let total_narrow = table.total(Population::Narrow);
    let wide_analysis = analyze(wide.rank, total_wide);
    let narrow_analysis = analyze(narrow.rank, total_narrow);

    Ok(RankQueryResult {
        score,
        year: table.year(),
        rank_wide: wide.rank,
        rank_narrow: narrow.rank,
        total_wide,
        total_narrow,
        percentage_wide: wide_analysis.percentage,
        percentile_wide: wide_analysis.percentile,
        percentage_narrow: narrow_analysis.percentage,
        percentile_narrow: narrow_analysis.percentile,
        method: wide.method,
        method_narrow: narrow.method,
        calculation_method: wide.method.describe(),
        rank_range: RankRange {
            start: wide.rank,
            end: wide.rank,
        },
        segment_count: table.segment_count(score, Population::Wide),
        analysis: report(&wide_analysis, Population::Wide),
        generated_at: Utc::now(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Batch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RejectedScore {
    pub score: f64,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRankResult {
    pub year: i32,
    pub results: Vec<RankQueryResult>,
    pub rejected: Vec<RejectedScore>,
}

/// Ranks every score against one year. Bad scores are reported, not fatal;
/// an unknown year still fails the whole batch.
pub async fn rank_batch(
    catalog: &Catalog,
    scores: &[f64],
    year: i32,
) -> Result<BatchRankResult, RankError> {
    let table = catalog.distribution(year).await?;
    let mut results = Vec::with_capacity(scores.len());
    let mut rejected = Vec::new();

    for &raw in scores {
        match Score::parse(raw).and_then(|score| evaluate(&table, score)) {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("Skipping score {raw} in batch for {year}: {e}");
                rejected.push(RejectedScore {
                    score: raw,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(BatchRankResult {
        year,
        results,
        rejected,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Trend across years
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub rank: u64,
    pub total: u64,
    pub percentage: f64,
    pub percentile: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub score: Score,
    pub points: Vec<TrendPoint>,
    pub summary: String,
}

/// Ranks the same score in each year (every known year when `years` is `None`).
/// Years that cannot be ranked are skipped.
pub async fn trend(
    catalog: &Catalog,
    score: f64,
    years: Option<Vec<i32>>,
) -> Result<TrendReport, RankError> {
    let score = Score::parse(score)?;
    let mut years = match years {
        Some(years) => years,
        None => catalog.years().await?,
    };
    years.sort_unstable();
    years.dedup();

    let mut points = Vec::with_capacity(years.len());
    for year in years {
        let point = async {
            let table = catalog.distribution(year).await?;
            let est = rank_in(&table, score, Population::Wide)?;
            let total = table.total(Population::Wide);
            let a = analyze(est.rank, total);
            Ok::<_, RankError>(TrendPoint {
                year,
                rank: est.rank,
                total,
                percentage: a.percentage,
                percentile: a.percentile,
            })
        }
        .await;
        match point {
            Ok(point) => points.push(point),
            Err(e) => warn!("Skipping {year} in trend for {score}: {e}"),
        }
    }

    let summary = describe_trend(&points);
    Ok(TrendReport {
        score,
        points,
        summary,
    })
}

fn describe_trend(points: &[TrendPoint]) -> String {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => (first, last),
        (Some(_), _) => return "Only one year available; no trend to compare.".to_string(),
        _ => return "No trend data available.".to_string(),
    };
    let change = last.percentage - first.percentage;
    let direction = if change.abs() < 1.0 {
        "stayed roughly stable".to_string()
    } else if change > 0.0 {
        format!("declined by {change:.1} percentage points")
    } else {
        format!("improved by {:.1} percentage points", -change)
    };
    format!(
        "From {} to {}, the standing of this score {direction}.",
        first.year, last.year
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Year statistics
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBand {
    pub label: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearStatistics {
    pub year: i32,
    pub max_score: Option<Score>,
    pub min_score: Option<Score>,
    pub score_levels: usize,
    pub total_wide: u64,
    pub total_narrow: u64,
    pub distribution: Vec<ScoreBand>,
    pub key_percentiles: BTreeMap<String, Score>,
}

/// Score bands reported for the wide population, as `[low, high)` whole points.
const SCORE_BANDS: &[(&str, i64, i64)] = &[
    (">=750", 750, 801),
    ("700-749", 700, 750),
    ("650-699", 650, 700),
    ("600-649", 600, 650),
    ("550-599", 550, 600),
    ("<550", 0, 550),
];

const KEY_PERCENTILES: &[u32] = &[99, 95, 90, 80, 70, 50];

pub async fn statistics(catalog: &Catalog, year: i32) -> Result<YearStatistics, RankError> {
    let table = catalog.distribution(year).await?;
    year_statistics(&table)
}

fn year_statistics(table: &DistributionTable) -> Result<YearStatistics, RankError> {
    let distribution = SCORE_BANDS
        .iter()
        .map(|&(label, low, high)| ScoreBand {
            label,
            count: table.count_between(
                Score::from_points(low),
                Score::from_points(high),
                Population::Wide,
            ),
        })
        .collect();

    let mut key_percentiles = BTreeMap::new();
    for &p in KEY_PERCENTILES {
        if let Some(score) = table.score_at_percentile(f64::from(p), Population::Wide)? {
            key_percentiles.insert(format!("p{p}"), score);
        }
    }

    Ok(YearStatistics {
        year: table.year(),
        max_score: table.scores().first().copied(),
        min_score: table.scores().last().copied(),
        score_levels: table.scores().len(),
        total_wide: table.total(Population::Wide),
        total_narrow: table.total(Population::Narrow),
        distribution,
        key_percentiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::ranking::analysis::PerformanceTier;

    #[tokio::test]
    async fn test_query_rank_interpolates_both_populations() {
        let catalog = sample_catalog();
        let r = query_rank(&catalog, 750.0, 2024).await.unwrap();
        assert_eq!(r.rank_wide, 501);
        // narrow: 1 + 0.5 * (400 - 1) = 200.5
        assert_eq!(r.rank_narrow, 201);
        assert_eq!(r.total_wide, 5000);
        assert_eq!(r.total_narrow, 2000);
        assert_eq!(r.rank_range.start, r.rank_wide);
        assert!(matches!(r.method, RankMethod::Interpolated { .. }));
        assert!(r.calculation_method.contains("800"));
    }

    #[tokio::test]
    async fn test_query_rank_exact_match() {
        let catalog = sample_catalog();
        let r = query_rank(&catalog, 700.0, 2024).await.unwrap();
        assert_eq!(r.rank_wide, 1000);
        assert_eq!(r.rank_narrow, 400);
        assert_eq!(r.method, RankMethod::ExactMatch);
        // percentile = (5000 - 1000 + 1) / 5000
        assert_eq!(r.percentile_wide, 80.02);
        assert_eq!(r.percentage_wide, 20.0);
        assert_eq!(r.analysis.tier, PerformanceTier::Good);
        assert_eq!(r.analysis.label, "Good");
        assert!(r.analysis.summary.contains("80.0%"), "{}", r.analysis.summary);
    }

    #[tokio::test]
    async fn test_query_rank_rejects_bad_scores_before_loading() {
        let catalog = sample_catalog();
        for bad in [-1.0, 750.123, 900.0] {
            let err = query_rank(&catalog, bad, 1999).await.unwrap_err();
            assert!(matches!(err, RankError::InvalidScore { .. }), "{bad}: {err}");
        }
    }

    #[tokio::test]
    async fn test_query_rank_unknown_year() {
        let catalog = sample_catalog();
        let err = query_rank(&catalog, 700.0, 1999).await.unwrap_err();
        assert!(matches!(err, RankError::DataNotFound { year: 1999, .. }));
    }

    #[tokio::test]
    async fn test_rank_single_population() {
        let catalog = sample_catalog();
        let top = rank(&catalog, 800.0, 2023, Population::Wide).await.unwrap();
        assert_eq!((top.rank, top.method), (1, RankMethod::BoundaryHigh));
        let bottom = rank(&catalog, 0.0, 2023, Population::Narrow).await.unwrap();
        assert_eq!((bottom.rank, bottom.method), (2500, RankMethod::BoundaryLow));
    }

    #[tokio::test]
    async fn test_rank_is_idempotent() {
        let catalog = sample_catalog();
        let a = rank(&catalog, 654.32, 2024, Population::Wide).await.unwrap();
        let b = rank(&catalog, 654.32, 2024, Population::Wide).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_batch_collects_rejections() {
        let catalog = sample_catalog();
        let batch = rank_batch(&catalog, &[700.0, -3.0, 650.5, 1.234], 2024)
            .await
            .unwrap();
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.rejected[0].score, -3.0);
    }

    #[tokio::test]
    async fn test_batch_unknown_year_fails() {
        let catalog = sample_catalog();
        assert!(rank_batch(&catalog, &[700.0], 1999).await.is_err());
    }

    #[tokio::test]
    async fn test_trend_across_years() {
        let catalog = sample_catalog();
        let report = trend(&catalog, 700.0, None).await.unwrap();
        let years: Vec<i32> = report.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2023, 2024]);
        // 2023: 1200/6000 = 20%, 2024: 1000/5000 = 20%
        assert!(report.summary.contains("stable"), "{}", report.summary);
    }

    #[tokio::test]
    async fn test_trend_skips_unknown_years() {
        let catalog = sample_catalog();
        let report = trend(&catalog, 650.0, Some(vec![2024, 1999]))
            .await
            .unwrap();
        assert_eq!(report.points.len(), 1);
        assert!(report.summary.starts_with("Only one year"));
    }

    #[test]
    fn test_describe_trend_direction() {
        let point = |year, percentage| TrendPoint {
            year,
            rank: 0,
            total: 0,
            percentage,
            percentile: 0.0,
        };
        let worse = describe_trend(&[point(2022, 10.0), point(2024, 12.5)]);
        assert!(worse.contains("declined by 2.5"), "{worse}");
        let better = describe_trend(&[point(2022, 10.0), point(2024, 7.0)]);
        assert!(better.contains("improved by 3.0"), "{better}");
        assert_eq!(describe_trend(&[]), "No trend data available.");
    }

    #[tokio::test]
    async fn test_statistics() {
        let catalog = sample_catalog();
        let stats = statistics(&catalog, 2024).await.unwrap();
        assert_eq!(stats.max_score, Some(Score::from_points(800)));
        assert_eq!(stats.min_score, Some(Score::from_points(600)));
        assert_eq!(stats.score_levels, 3);
        assert_eq!(stats.total_wide, 5000);

        let band = |label: &str| {
            stats
                .distribution
                .iter()
                .find(|b| b.label == label)
                .map(|b| b.count)
                .unwrap()
        };
        // at_or_above(750) is the 800 row's count
        assert_eq!(band(">=750"), 1);
        assert_eq!(band("700-749"), 999);
        // nothing is recorded between 600 and 700, so the 600 row carries them
        assert_eq!(band("650-699"), 0);
        assert_eq!(band("600-649"), 4000);
        assert_eq!(band("<550"), 0);
        let sum: u64 = stats.distribution.iter().map(|b| b.count).sum();
        assert_eq!(sum, 5000);

        assert_eq!(stats.key_percentiles["p50"], Score::from_points(600));
    }
}
