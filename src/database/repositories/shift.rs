use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{models::Shift, utils::sql};

const SHIFT_COLUMNS: &str = "id, shift_date, worker_id, created_at, updated_at, updated_by";

#[derive(Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn for_date(&self, date: NaiveDate) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&sql(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
            FROM shifts
            WHERE shift_date = ?
            ORDER BY worker_id ASC
            "#
        )))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    pub async fn in_range(&self, first: NaiveDate, last: NaiveDate) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&sql(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
            FROM shifts
            WHERE shift_date >= ? AND shift_date <= ?
            ORDER BY shift_date ASC, worker_id ASC
            "#
        )))
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Replace a day's roster in one transaction: remove workers that left
    /// the list, insert the new ones, restamp the rest.
    pub async fn replace_for_date(
        &self,
        date: NaiveDate,
        added: &[String],
        removed: &[String],
        kept: &[String],
        admin_id: &str,
    ) -> Result<Vec<Shift>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for worker_id in removed {
            sqlx::query("DELETE FROM shifts WHERE shift_date = ? AND worker_id = ?")
                .bind(date)
                .bind(worker_id)
                .execute(&mut *tx)
                .await?;
        }

        for worker_id in added {
            sqlx::query(&sql(r#"
                INSERT INTO
                    shifts (id, shift_date, worker_id, created_at, updated_at, updated_by)
                VALUES
                    (?, ?, ?, ?, ?, ?)
            "#))
            .bind(Uuid::new_v4().to_string())
            .bind(date)
            .bind(worker_id)
            .bind(now)
            .bind(now)
            .bind(admin_id)
            .execute(&mut *tx)
            .await?;
        }

        for worker_id in kept {
            sqlx::query(&sql(r#"
                UPDATE shifts
                SET updated_at = ?, updated_by = ?
                WHERE shift_date = ? AND worker_id = ?
            "#))
            .bind(now)
            .bind(admin_id)
            .bind(date)
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.for_date(date).await
    }
}
