use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::{Dataset, DatasetError};
use crate::models::{InstitutionRecord, ScoreCountRecord};

/// In-memory dataset, usually read from a JSON file shaped as
/// `{"scores": [ScoreCountRecord...], "institutions": [InstitutionRecord...]}`.
///
/// A year is known when any record of either kind carries it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticDataset {
    #[serde(default)]
    scores: Vec<ScoreCountRecord>,
    #[serde(default)]
    institutions: Vec<InstitutionRecord>,
}

impl StaticDataset {
    #[cfg(test)]
    pub fn new(scores: Vec<ScoreCountRecord>, institutions: Vec<InstitutionRecord>) -> Self {
        Self {
            scores,
            institutions,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&raw)?;
        info!(
            "Loaded dataset file {} ({} score rows, {} institutions)",
            path.display(),
            dataset.scores.len(),
            dataset.institutions.len()
        );
        Ok(dataset)
    }

    fn known_years(&self) -> BTreeSet<i32> {
        self.scores
            .iter()
            .map(|r| r.year)
            .chain(self.institutions.iter().map(|r| r.year))
            .collect()
    }
}

#[async_trait]
impl Dataset for StaticDataset {
    async fn score_records(
        &self,
        year: i32,
    ) -> Result<Option<Vec<ScoreCountRecord>>, DatasetError> {
        if !self.known_years().contains(&year) {
            return Ok(None);
        }
        Ok(Some(
            self.scores.iter().filter(|r| r.year == year).cloned().collect(),
        ))
    }

    async fn institutions(
        &self,
        year: i32,
    ) -> Result<Option<Vec<InstitutionRecord>>, DatasetError> {
        if !self.known_years().contains(&year) {
            return Ok(None);
        }
        Ok(Some(
            self.institutions
                .iter()
                .filter(|r| r.year == year)
                .cloned()
                .collect(),
        ))
    }

    async fn years(&self) -> Result<Vec<i32>, DatasetError> {
        Ok(self.known_years().into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "scores": [
            {"year": 2024, "score": 760, "count_wide": 40, "count_narrow": 12},
            {"year": 2024, "score": 759.5, "count_wide": 0, "count_narrow": 15},
            {"year": 2023, "score": 760, "count_wide": 55}
        ],
        "institutions": [
            {"year": 2023, "name": "North High", "admission_rank": 900}
        ]
    }"#;

    #[tokio::test]
    async fn test_unknown_year_is_none() {
        let ds = StaticDataset::from_json(SAMPLE).unwrap();
        assert!(ds.score_records(1999).await.unwrap().is_none());
        assert!(ds.institutions(1999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_known_year_without_institutions_is_empty() {
        let ds = StaticDataset::from_json(SAMPLE).unwrap();
        let schools = ds.institutions(2024).await.unwrap();
        assert_eq!(schools, Some(vec![]));
    }

    #[tokio::test]
    async fn test_records_filtered_by_year() {
        let ds = StaticDataset::from_json(SAMPLE).unwrap();
        let rows = ds.score_records(2024).await.unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.year == 2024));

        let old = ds.score_records(2023).await.unwrap().unwrap();
        assert_eq!(old[0].count_narrow, 0, "missing count defaults to zero");
    }

    #[tokio::test]
    async fn test_years_sorted_and_deduplicated() {
        let ds = StaticDataset::from_json(SAMPLE).unwrap();
        assert_eq!(ds.years().await.unwrap(), vec![2023, 2024]);
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let ds = StaticDataset::from_path(file.path()).unwrap();
        assert_eq!(ds.years().await.unwrap(), vec![2023, 2024]);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = StaticDataset::from_json("{not json").unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
    }
}
