//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Progress Repository ===

    /// Record one progress report.
    ///
    /// Keeps the best percent ever reached, the latest percent and error
    /// count, and counts the report as one play.
    pub async fn record_progress(&self, report: &story_core::ProgressReport) -> Result<GameProgress> {
        let progress = sqlx::query_as::<_, GameProgress>(
            r#"
            INSERT INTO game_progress (story_id, game_id, best_percent, last_percent, last_errors, plays)
            VALUES ($1, $2, $3, $3, $4, 1)
            ON CONFLICT (story_id, game_id) DO UPDATE SET
                best_percent = GREATEST(game_progress.best_percent, EXCLUDED.best_percent),
                last_percent = EXCLUDED.last_percent,
                last_errors = EXCLUDED.last_errors,
                plays = game_progress.plays + 1,
                updated_at = NOW()
            RETURNING story_id, game_id, best_percent, last_percent, last_errors, plays, updated_at
            "#,
        )
        .bind(&report.story_id)
        .bind(&report.game_id)
        .bind(i16::from(report.percent))
        .bind(i32::try_from(report.errors).unwrap_or(i32::MAX))
        .fetch_one(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Get progress of every played game of a story
    pub async fn get_story_progress(&self, story_id: &str) -> Result<Vec<GameProgress>> {
        let progress = sqlx::query_as::<_, GameProgress>(
            r#"
            SELECT story_id, game_id, best_percent, last_percent, last_errors, plays, updated_at
            FROM game_progress
            WHERE story_id = $1
            ORDER BY game_id
            "#,
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Delete all progress of a story
    pub async fn delete_story_progress(&self, story_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM game_progress
            WHERE story_id = $1
            "#,
        )
        .bind(story_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
