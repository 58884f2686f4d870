use async_trait::async_trait;
use sqlx::PgPool;

use super::{Dataset, DatasetError};
use crate::models::{InstitutionRecord, ScoreCountRecord};

/// PostgreSQL-backed dataset. Table layout lives in `sql/schema.sql`.
///
/// A year is known when it appears in either `score_records` or `institutions`.
#[derive(Clone)]
pub struct PgDataset {
    pool: PgPool,
}

impl PgDataset {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn year_known(&self, year: i32) -> Result<bool, DatasetError> {
        let known: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM score_records WHERE year = $1)
                OR EXISTS (SELECT 1 FROM institutions WHERE year = $1)
            "#,
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await?;
        Ok(known)
    }
}

#[async_trait]
impl Dataset for PgDataset {
    async fn score_records(
        &self,
        year: i32,
    ) -> Result<Option<Vec<ScoreCountRecord>>, DatasetError> {
        let rows: Vec<ScoreCountRecord> = sqlx::query_as(
            r#"
            SELECT year, score,
                   COALESCE(count_wide, 0) AS count_wide,
                   COALESCE(count_narrow, 0) AS count_narrow
            FROM score_records
            WHERE year = $1
            ORDER BY score DESC
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() && !self.year_known(year).await? {
            return Ok(None);
        }
        Ok(Some(rows))
    }

    async fn institutions(
        &self,
        year: i32,
    ) -> Result<Option<Vec<InstitutionRecord>>, DatasetError> {
        let rows: Vec<InstitutionRecord> = sqlx::query_as(
            r#"
            SELECT year, name, admission_rank, district, category, admission_score
            FROM institutions
            WHERE year = $1
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() && !self.year_known(year).await? {
            return Ok(None);
        }
        Ok(Some(rows))
    }

    async fn years(&self) -> Result<Vec<i32>, DatasetError> {
        let years: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT year FROM score_records
            UNION
            SELECT year FROM institutions
            ORDER BY year
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }
}
