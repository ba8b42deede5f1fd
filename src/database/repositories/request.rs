use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{
    models::{Request, RequestDetail, RequestFilter, RequestStatus, ShiftConflict},
    utils::sql,
};

const REQUEST_COLUMNS: &str =
    "id, worker_id, request_date, status, created_at, decided_at, decided_by";

#[derive(Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new pending request. The partial unique index on
    /// (worker_id, request_date) rejects a second non-rejected row, so a
    /// concurrent duplicate surfaces as a unique violation here.
    pub async fn insert(&self, worker_id: &str, request_date: NaiveDate) -> Result<Request> {
        let request = sqlx::query_as::<_, Request>(&sql(&format!(
            r#"
            INSERT INTO
                requests (id, worker_id, request_date, status, created_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING {REQUEST_COLUMNS}
            "#
        )))
        .bind(Uuid::new_v4().to_string())
        .bind(worker_id)
        .bind(request_date)
        .bind(RequestStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Request>> {
        let request = sqlx::query_as::<_, Request>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The live (pending or approved) request for a worker/date, if any
    pub async fn find_active(
        &self,
        worker_id: &str,
        request_date: NaiveDate,
    ) -> Result<Option<Request>> {
        let request = sqlx::query_as::<_, Request>(&sql(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM requests
            WHERE worker_id = ? AND request_date = ? AND status <> ?
            "#
        )))
        .bind(worker_id)
        .bind(request_date)
        .bind(RequestStatus::Rejected)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Flip a pending request into a terminal state. The status guard in the
    /// WHERE clause is what serializes concurrent decisions: the loser
    /// matches zero rows and gets None back.
    pub async fn decide_if_pending(
        &self,
        id: &str,
        status: RequestStatus,
        admin_id: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<Option<Request>> {
        let request = sqlx::query_as::<_, Request>(&sql(&format!(
            r#"
            UPDATE requests
            SET status = ?, decided_at = ?, decided_by = ?
            WHERE id = ? AND status = ?
            RETURNING {REQUEST_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(decided_at)
        .bind(admin_id)
        .bind(id)
        .bind(RequestStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// A worker's own history, newest target date first
    pub async fn list_for_worker(
        &self,
        worker_id: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>> {
        let mut query = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE worker_id = ?"
        );

        if status.is_some() {
            query.push_str(" AND status = ?");
        }

        query.push_str(" ORDER BY request_date DESC");

        let mut prepared = sqlx::query_as::<_, Request>(&query).bind(worker_id);
        if let Some(s) = status {
            prepared = prepared.bind(s);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// Admin listing: joined with worker/decider names, unresolved rows
    /// first, then target date ascending within each status group. The
    /// month filter arrives pre-resolved to a date range.
    pub async fn list_detailed(
        &self,
        filter: &RequestFilter,
        date_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<RequestDetail>> {
        let mut query = sql(r#"
            SELECT
                r.id,
                r.worker_id,
                u.name AS worker_name,
                r.request_date,
                r.status,
                r.created_at,
                r.decided_at,
                r.decided_by,
                p.name AS decided_by_name
            FROM requests r
            JOIN users u ON r.worker_id = u.id
            LEFT JOIN users p ON r.decided_by = p.id
        "#);

        let mut conditions = Vec::new();
        let mut text_params = Vec::new();

        if let Some(status) = &filter.status {
            conditions.push("r.status = ?");
            text_params.push(status.to_string());
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            conditions.push("u.name LIKE ?");
            text_params.push(format!("%{}%", search));
        }

        if date_range.is_some() {
            conditions.push("r.request_date >= ? AND r.request_date <= ?");
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push(' ');
        query.push_str(&sql(r#"
            ORDER BY
                CASE WHEN r.status = 'pending' THEN 0 ELSE 1 END,
                r.request_date ASC
        "#));

        let mut prepared = sqlx::query_as::<_, RequestDetail>(&query);
        for param in text_params {
            prepared = prepared.bind(param);
        }
        if let Some((first, last)) = date_range {
            prepared = prepared.bind(first).bind(last);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// True when the worker has at least one non-rejected request with a
    /// target date inside [first, last]
    pub async fn has_non_rejected_in_range(
        &self,
        worker_id: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT COUNT(*)
            FROM requests
            WHERE worker_id = ?
                AND status <> ?
                AND request_date >= ?
                AND request_date <= ?
        "#))
        .bind(worker_id)
        .bind(RequestStatus::Rejected)
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Approved unavailability for any of the given workers on a date
    pub async fn approved_for_workers_on(
        &self,
        date: NaiveDate,
        worker_ids: &[String],
    ) -> Result<Vec<ShiftConflict>> {
        if worker_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; worker_ids.len()].join(", ");
        let query = sql(&format!(
            r#"
            SELECT
                r.worker_id,
                u.name AS worker_name,
                r.request_date AS shift_date,
                r.id AS request_id
            FROM requests r
            JOIN users u ON r.worker_id = u.id
            WHERE r.status = ? AND r.request_date = ? AND r.worker_id IN ({placeholders})
            ORDER BY u.name ASC
            "#
        ));

        let mut prepared = sqlx::query_as::<_, ConflictRow>(&query)
            .bind(RequestStatus::Approved)
            .bind(date);
        for worker_id in worker_ids {
            prepared = prepared.bind(worker_id);
        }

        let rows = prepared.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(ConflictRow::into_conflict).collect())
    }

    /// All approved (date, worker) pairs in a date range, for the admin
    /// calendar overlay
    pub async fn approved_in_range(
        &self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<(NaiveDate, String)>> {
        let rows = sqlx::query_as::<_, (NaiveDate, String)>(&sql(r#"
            SELECT request_date, worker_id
            FROM requests
            WHERE status = ? AND request_date >= ? AND request_date <= ?
            ORDER BY request_date ASC
        "#))
        .bind(RequestStatus::Approved)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[derive(sqlx::FromRow)]
struct ConflictRow {
    worker_id: String,
    worker_name: String,
    shift_date: NaiveDate,
    request_id: String,
}

impl ConflictRow {
    fn into_conflict(self) -> ShiftConflict {
        ShiftConflict {
            worker_id: self.worker_id,
            worker_name: self.worker_name,
            shift_date: self.shift_date,
            request_id: self.request_id,
        }
    }
}
