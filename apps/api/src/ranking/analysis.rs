use serde::Serialize;

use super::table::Population;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Top,
    Excellent,
    Good,
    Average,
    Developing,
}

/// Inclusive lower percentile bounds, highest first. Anything below the last
/// bound is `Developing`.
const TIER_BOUNDS: &[(f64, PerformanceTier)] = &[
    (95.0, PerformanceTier::Top),
    (85.0, PerformanceTier::Excellent),
    (70.0, PerformanceTier::Good),
    (50.0, PerformanceTier::Average),
];

impl PerformanceTier {
    pub fn from_percentile(percentile: f64) -> Self {
        TIER_BOUNDS
            .iter()
            .find(|(bound, _)| percentile >= *bound)
            .map_or(PerformanceTier::Developing, |(_, tier)| *tier)
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Top => "Top",
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::Developing => "Developing",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PerformanceTier::Top => "An outstanding result, among the very best in the cohort.",
            PerformanceTier::Excellent => "A strong result, well within the leading group.",
            PerformanceTier::Good => "A solid result with plenty of room to go further.",
            PerformanceTier::Average => "A mid-table result; steady effort will move it up.",
            PerformanceTier::Developing => "There is a lot of room to improve from here.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankAnalysis {
    /// Share of the population at or above this rank. Smaller is better.
    pub percentage: f64,
    /// Share of the population this candidate outscores. Larger is better.
    pub percentile: f64,
    pub tier: PerformanceTier,
}

pub fn analyze(rank: u64, total: u64) -> RankAnalysis {
    let (percentage, percentile) = if total == 0 {
        (0.0, 0.0)
    } else {
        let total_f = total as f64;
        (
            round2(rank as f64 / total_f * 100.0),
            round2((total_f - rank as f64 + 1.0) / total_f * 100.0),
        )
    };
    RankAnalysis {
        percentage,
        percentile,
        tier: PerformanceTier::from_percentile(percentile),
    }
}

/// One-paragraph summary for display next to the numbers.
pub fn summarize(analysis: &RankAnalysis, population: Population) -> String {
    format!(
        "Performance tier: {}. {} You scored higher than {:.1}% of candidates in the {} population.",
        analysis.tier.label(),
        analysis.tier.description(),
        analysis.percentile,
        population.as_str()
    )
}

/// Tier, its wording and the summary paragraph, as reported alongside a rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub tier: PerformanceTier,
    pub label: &'static str,
    pub description: &'static str,
    pub summary: String,
}

pub fn report(analysis: &RankAnalysis, population: Population) -> AnalysisReport {
    AnalysisReport {
        tier: analysis.tier,
        label: analysis.tier.label(),
        description: analysis.tier.description(),
        summary: summarize(analysis, population),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_and_percentile() {
        let a = analyze(1, 1000);
        assert_eq!(a.percentage, 0.1);
        assert_eq!(a.percentile, 100.0);

        let b = analyze(1000, 1000);
        assert_eq!(b.percentage, 100.0);
        assert_eq!(b.percentile, 0.1);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let a = analyze(1, 3);
        assert_eq!(a.percentage, 33.33);
        assert_eq!(a.percentile, 100.0);
        let b = analyze(2, 3);
        assert_eq!(b.percentile, 66.67);
    }

    #[test]
    fn test_tier_bounds_are_inclusive() {
        assert_eq!(PerformanceTier::from_percentile(100.0), PerformanceTier::Top);
        assert_eq!(PerformanceTier::from_percentile(95.0), PerformanceTier::Top);
        assert_eq!(PerformanceTier::from_percentile(94.99), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentile(85.0), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentile(70.0), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentile(50.0), PerformanceTier::Average);
        assert_eq!(PerformanceTier::from_percentile(49.99), PerformanceTier::Developing);
        assert_eq!(PerformanceTier::from_percentile(0.0), PerformanceTier::Developing);
    }

    #[test]
    fn test_summary_mentions_tier_and_percentile() {
        let a = analyze(100, 1000);
        let text = summarize(&a, Population::Wide);
        assert!(text.starts_with("Performance tier: Excellent."), "{text}");
        assert!(text.contains("90.1%"), "{text}");
        assert!(text.contains("wide population"), "{text}");
    }

    #[test]
    fn test_report_carries_label_and_description() {
        let a = analyze(30, 1000);
        let r = report(&a, Population::Narrow);
        assert_eq!(r.tier, PerformanceTier::Top);
        assert_eq!(r.label, "Top");
        assert_eq!(r.description, PerformanceTier::Top.description());
        assert!(r.summary.contains("narrow population"), "{}", r.summary);

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["tier"], "top");
        assert_eq!(json["label"], "Top");
    }
}
