use crate::domain::lottery::Draw;
use crate::domain::repositories::DrawRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use tracing::debug;

pub struct SqliteDrawRepository {
    database: Database,
}

impl SqliteDrawRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// Numbers are stored as a comma separated list ("4,17,23")
fn encode_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_numbers(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .with_context(|| format!("Corrupt number list: {:?}", raw))
        })
        .collect()
}

#[async_trait]
impl DrawRepository for SqliteDrawRepository {
    async fn save(&self, lottery_context: &str, draw: &Draw) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO draws (lottery_context, concurso, draw_date, numbers)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(lottery_context, concurso) DO UPDATE SET
                draw_date = excluded.draw_date,
                numbers = excluded.numbers
            "#,
        )
        .bind(lottery_context)
        .bind(draw.concurso as i64)
        .bind(draw.date)
        .bind(encode_numbers(draw.numbers()))
        .execute(&self.database.pool)
        .await
        .context("Failed to save draw")?;

        debug!("Persisted draw {} for {}", draw.concurso, lottery_context);
        Ok(())
    }

    async fn find_recent(&self, lottery_context: &str, limit: usize) -> Result<Vec<Draw>> {
        let rows = sqlx::query(
            r#"
            SELECT concurso, draw_date, numbers FROM draws
            WHERE lottery_context = ?
            ORDER BY concurso DESC
            LIMIT ?
            "#,
        )
        .bind(lottery_context)
        .bind(limit.min(i64::MAX as usize) as i64)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to load draws")?;

        let mut draws = Vec::with_capacity(rows.len());
        for row in rows {
            let concurso: i64 = row.try_get("concurso")?;
            let date: NaiveDate = row.try_get("draw_date")?;
            let numbers: String = row.try_get("numbers")?;
            draws.push(Draw::new(
                u32::try_from(concurso).context("concurso out of range")?,
                date,
                decode_numbers(&numbers)?,
            ));
        }
        Ok(draws)
    }

    async fn count(&self, lottery_context: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM draws WHERE lottery_context = ?")
            .bind(lottery_context)
            .fetch_one(&self.database.pool)
            .await
            .context("Failed to count draws")?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_list_encoding() {
        assert_eq!(encode_numbers(&[4, 17, 23]), "4,17,23");
        assert_eq!(decode_numbers("4,17,23").unwrap(), vec![4, 17, 23]);
        assert!(decode_numbers("4,x").is_err());
        assert!(decode_numbers("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_draws_round_trip() {
        let repo = SqliteDrawRepository::new(Database::in_memory().await.unwrap());
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        repo.save("megasena", &Draw::new(10, date, vec![60, 1, 30]))
            .await
            .unwrap();
        repo.save("megasena", &Draw::new(11, date, vec![2, 3, 4]))
            .await
            .unwrap();

        let recent = repo.find_recent("megasena", 5).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].concurso, 11);
        assert_eq!(recent[1].numbers(), &[1, 30, 60]);
        assert_eq!(recent[1].date, date);
        assert_eq!(repo.count("megasena").await.unwrap(), 2);
        assert_eq!(repo.count("quina").await.unwrap(), 0);
    }
}
