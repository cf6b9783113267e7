use crate::domain::performance::StrategyWeight;
use crate::domain::repositories::StrategyWeightRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

pub struct SqliteStrategyWeightRepository {
    database: Database,
}

impl SqliteStrategyWeightRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

fn weight_from_row(row: &SqliteRow) -> Result<StrategyWeight> {
    let samples: i64 = row.try_get("samples")?;
    let updated_at: i64 = row.try_get("updated_at")?;
    Ok(StrategyWeight {
        strategy: row.try_get("strategy")?,
        lottery_context: row.try_get("lottery_context")?,
        weight: row.try_get("weight")?,
        confidence: row.try_get("confidence")?,
        avg_hits: row.try_get("avg_hits")?,
        samples: u32::try_from(samples).unwrap_or(u32::MAX),
        updated_at: DateTime::<Utc>::from_timestamp(updated_at, 0).unwrap_or_default(),
    })
}

#[async_trait]
impl StrategyWeightRepository for SqliteStrategyWeightRepository {
    async fn find(&self, strategy: &str, lottery_context: &str) -> Result<Option<StrategyWeight>> {
        let row = sqlx::query(
            "SELECT * FROM strategy_weights WHERE strategy = ? AND lottery_context = ?",
        )
        .bind(strategy)
        .bind(lottery_context)
        .fetch_optional(&self.database.pool)
        .await
        .context("Failed to load strategy weight")?;

        row.as_ref().map(weight_from_row).transpose()
    }

    async fn save(&self, weight: &StrategyWeight) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO strategy_weights
                (strategy, lottery_context, weight, confidence, avg_hits, samples, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(strategy, lottery_context) DO UPDATE SET
                weight = excluded.weight,
                confidence = excluded.confidence,
                avg_hits = excluded.avg_hits,
                samples = excluded.samples,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&weight.strategy)
        .bind(&weight.lottery_context)
        .bind(weight.weight)
        .bind(weight.confidence)
        .bind(weight.avg_hits)
        .bind(weight.samples as i64)
        .bind(weight.updated_at.timestamp())
        .execute(&self.database.pool)
        .await
        .context("Failed to save strategy weight")?;

        debug!(
            "Persisted weight {:.3} for {}/{}",
            weight.weight, weight.strategy, weight.lottery_context
        );
        Ok(())
    }

    async fn find_all(&self, lottery_context: &str) -> Result<Vec<StrategyWeight>> {
        let rows = sqlx::query(
            "SELECT * FROM strategy_weights WHERE lottery_context = ? ORDER BY strategy",
        )
        .bind(lottery_context)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to load strategy weights")?;

        rows.iter().map(weight_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_lookup() {
        let repo = SqliteStrategyWeightRepository::new(Database::in_memory().await.unwrap());

        let mut weight = StrategyWeight::neutral("overdue", "megasena", 0.5);
        repo.save(&weight).await.unwrap();
        weight.weight = 1.4;
        weight.samples = 3;
        weight.avg_hits = 0.84;
        repo.save(&weight).await.unwrap();

        let stored = repo.find("overdue", "megasena").await.unwrap().unwrap();
        assert_eq!(stored.weight, 1.4);
        assert_eq!(stored.samples, 3);
        assert_eq!(stored.avg_hits, 0.84);
        assert_eq!(repo.find_all("megasena").await.unwrap().len(), 1);
        assert!(repo.find("overdue", "quina").await.unwrap().is_none());
    }
}
