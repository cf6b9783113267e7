use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared SQLite pool with the lottoscope schema applied
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal); // Better for concurrency

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Private in-memory database for tests and `--synthetic` runs.
    ///
    /// Every SQLite connection opens its own memory database, so the pool is
    /// pinned to one connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // 1. Draw history
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS draws (
                lottery_context TEXT NOT NULL,
                concurso INTEGER NOT NULL,
                draw_date DATE NOT NULL,
                numbers TEXT NOT NULL,
                PRIMARY KEY (lottery_context, concurso)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create draws table")?;

        // 2. Strategy weights
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS strategy_weights (
                strategy TEXT NOT NULL,
                lottery_context TEXT NOT NULL,
                weight REAL NOT NULL,
                confidence REAL NOT NULL,
                avg_hits REAL NOT NULL,
                samples INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (strategy, lottery_context)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create strategy_weights table")?;

        info!("Database schema initialized");
        Ok(())
    }
}
