use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{
    models::{DEADLINE_DAY_KEY, DeadlineChange, Setting},
    utils::sql,
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT id, key, value, updated_at, updated_by FROM settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Store a new cutoff day and append the history entry in the same
    /// transaction, so the current value and its audit line never diverge.
    pub async fn set_deadline_day(
        &self,
        old_day: Option<i64>,
        new_day: i64,
        admin_id: &str,
    ) -> Result<DeadlineChange> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&sql(r#"
            INSERT INTO settings (id, key, value, updated_at, updated_by)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
        "#))
        .bind(Uuid::new_v4().to_string())
        .bind(DEADLINE_DAY_KEY)
        .bind(new_day.to_string())
        .bind(now)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;

        let change = sqlx::query_as::<_, DeadlineChange>(&sql(r#"
            INSERT INTO
                deadline_history (id, old_day, new_day, changed_by, changed_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id, old_day, new_day, changed_by, changed_at
        "#))
        .bind(Uuid::new_v4().to_string())
        .bind(old_day)
        .bind(new_day)
        .bind(admin_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(change)
    }

    /// Deadline changes, newest first
    pub async fn deadline_history(&self, limit: Option<i64>) -> Result<Vec<DeadlineChange>> {
        let mut query = sql(r#"
            SELECT id, old_day, new_day, changed_by, changed_at
            FROM deadline_history
            ORDER BY changed_at DESC, id DESC
        "#);

        if limit.is_some() {
            query.push_str(" LIMIT ?");
        }

        let mut prepared = sqlx::query_as::<_, DeadlineChange>(&query);
        if let Some(n) = limit {
            prepared = prepared.bind(n);
        }

        let history = prepared.fetch_all(&self.pool).await?;

        Ok(history)
    }
}
