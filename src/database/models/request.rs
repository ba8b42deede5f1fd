use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

/// One worker's claim that a calendar date is unworkable. Rows are never
/// deleted; rejected requests stay behind as the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub worker_id: String,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl RequestStatus {
    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// The two admin outcomes for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Approve,
    Reject,
}

impl RequestDecision {
    pub fn target_status(&self) -> RequestStatus {
        match self {
            RequestDecision::Approve => RequestStatus::Approved,
            RequestDecision::Reject => RequestStatus::Rejected,
        }
    }
}

/// Admin-facing row: a request joined with its worker and decider names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    pub id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
    pub decided_by_name: Option<String>,
}

/// Filters accepted by the admin request listing.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Partial match on the worker's display name.
    pub search: Option<String>,
}
