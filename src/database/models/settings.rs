use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key under which the current cutoff day is stored.
pub const DEADLINE_DAY_KEY: &str = "request_deadline_day";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Append-only record of one cutoff change. `old_day` is empty for the
/// first value ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineChange {
    pub id: String,
    pub old_day: Option<i64>,
    pub new_day: i64,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}
