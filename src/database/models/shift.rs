use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A planned (date, worker) work slot, owned by the admin scheduling surface.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub shift_date: NaiveDate,
    pub worker_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Advisory flag: the worker holds an approved unavailability request for
/// the assigned date. Never blocks the assignment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftConflict {
    pub worker_id: String,
    pub worker_name: String,
    pub shift_date: NaiveDate,
    pub request_id: String,
}

impl ShiftConflict {
    pub fn message(&self) -> String {
        format!(
            "{} has an approved day off on {}",
            self.worker_name, self.shift_date
        )
    }
}

/// Result of replacing a day's roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftUpdate {
    pub shifts: Vec<Shift>,
    pub conflicts: Vec<ShiftConflict>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}
