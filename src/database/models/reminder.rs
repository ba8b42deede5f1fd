use chrono::{DateTime, Utc};
use serde::Serialize;

/// One successfully dispatched reminder. The row's existence is the sole
/// source of truth for "this worker was already nudged at this offset".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLog {
    pub id: String,
    pub worker_id: String,
    pub sent_at: DateTime<Utc>,
    pub days_before_deadline: i64,
    pub target_month: i64,
    pub target_year: i64,
}

/// What a single `ReminderService::run` did, for the job log and the manual
/// trigger endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunReport {
    /// The matched offset, when today was a reminder day.
    pub offset: Option<i64>,
    pub workers_considered: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub failed: usize,
}
