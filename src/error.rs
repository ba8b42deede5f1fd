use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use thiserror::Error;

use crate::database::models::RequestStatus;
use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("A request for {date} already exists and is {status}")]
    DuplicateRequest { date: NaiveDate, status: RequestStatus },

    #[error(
        "The submission window is closed: requests for next month must be in before day {deadline_day} (today is {today})"
    )]
    DeadlineExceeded { deadline_day: u32, today: NaiveDate },

    #[error("Requests may only target next month; {date} is out of range for {today}")]
    InvalidTargetDate { date: NaiveDate, today: NaiveDate },

    #[error("This request was already {status} and cannot be changed")]
    AlreadyDecided { status: RequestStatus },

    #[error("Deadline day must be between 1 and 31, got {0}")]
    InvalidDeadline(i64),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    Internal(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateRequest { .. } => StatusCode::CONFLICT,
            AppError::AlreadyDecided { .. } => StatusCode::CONFLICT,
            AppError::DeadlineExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidTargetDate { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidDeadline(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, error_message);
        } else {
            log::warn!("Request rejected with status {}: {}", status_code, error_message);
        }

        let response_body = ApiResponse::<()>::error(&error_message);

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::Database(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Surface sqlx errors under their own variant so callers can
        // distinguish storage failures from plain internal ones.
        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::from(sqlx_err),
                Err(original_error) => {
                    return AppError::Internal(Some(original_error.to_string()));
                }
            }
        }

        log::error!("Internal error: {}", error);
        AppError::Internal(Some(error.to_string()))
    }
}

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(Some(message.into()))
    }
}

/// True when the error is a unique-constraint violation, i.e. a concurrent
/// writer got there first.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db_err))
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
