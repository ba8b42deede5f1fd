use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{models::ReminderLog, utils::sql};

#[derive(Clone)]
pub struct ReminderLogRepository {
    pool: SqlitePool,
}

impl ReminderLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn exists(
        &self,
        worker_id: &str,
        target_year: i64,
        target_month: i64,
        days_before_deadline: i64,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT COUNT(*)
            FROM reminder_logs
            WHERE worker_id = ?
                AND target_year = ?
                AND target_month = ?
                AND days_before_deadline = ?
        "#))
        .bind(worker_id)
        .bind(target_year)
        .bind(target_month)
        .bind(days_before_deadline)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Record a dispatched reminder. Returns false when the unique index
    /// says another run already recorded this (worker, month, offset) —
    /// the retry case, not an error.
    pub async fn record(
        &self,
        worker_id: &str,
        target_year: i64,
        target_month: i64,
        days_before_deadline: i64,
    ) -> Result<bool> {
        let result = sqlx::query(&sql(r#"
            INSERT OR IGNORE INTO reminder_logs
                (id, worker_id, sent_at, days_before_deadline, target_month, target_year)
            VALUES
                (?, ?, ?, ?, ?, ?)
        "#))
        .bind(Uuid::new_v4().to_string())
        .bind(worker_id)
        .bind(Utc::now())
        .bind(days_before_deadline)
        .bind(target_month)
        .bind(target_year)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Everything sent for one target month, for the admin report
    pub async fn for_target_month(
        &self,
        target_year: i64,
        target_month: i64,
    ) -> Result<Vec<ReminderLog>> {
        let logs = sqlx::query_as::<_, ReminderLog>(&sql(r#"
            SELECT id, worker_id, sent_at, days_before_deadline, target_month, target_year
            FROM reminder_logs
            WHERE target_year = ? AND target_month = ?
            ORDER BY sent_at ASC
        "#))
        .bind(target_year)
        .bind(target_month)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
