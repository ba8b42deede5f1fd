use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;

use crate::database::models::{RequestDecision, RequestFilter, RequestStatus};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{DeadlineService, ReminderService, RequestService};

#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    pub admin_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineInput {
    pub day: i64,
    pub admin_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Admin request listing; pending entries always come first
pub async fn list_requests(
    service: web::Data<RequestService>,
    query: web::Query<RequestListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    let status = match query.status.as_deref() {
        Some(raw) => Some(raw.parse::<RequestStatus>().map_err(AppError::BadRequest)?),
        None => None,
    };

    let filter = RequestFilter {
        status,
        month: query.month,
        year: query.year,
        search: query.search,
    };

    let requests = service.list_all(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn approve_request(
    service: web::Data<RequestService>,
    path: web::Path<String>,
    input: web::Json<DecisionInput>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .decide(&path.into_inner(), RequestDecision::Approve, &input.admin_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn reject_request(
    service: web::Data<RequestService>,
    path: web::Path<String>,
    input: web::Json<DecisionInput>,
) -> Result<HttpResponse, AppError> {
    let request = service
        .decide(&path.into_inner(), RequestDecision::Reject, &input.admin_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn get_deadline(
    service: web::Data<DeadlineService>,
) -> Result<HttpResponse, AppError> {
    let day = service.deadline_day().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "day": day }))))
}

pub async fn set_deadline(
    service: web::Data<DeadlineService>,
    input: web::Json<DeadlineInput>,
) -> Result<HttpResponse, AppError> {
    let change = service.set_deadline_day(input.day, &input.admin_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(change)))
}

pub async fn deadline_history(
    service: web::Data<DeadlineService>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let history = service.history(query.limit).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(history)))
}

/// Manual trigger for the daily reminder sweep; same code path as the
/// scheduler, so it is just as safe to re-run.
pub async fn run_reminders(
    service: web::Data<ReminderService>,
) -> Result<HttpResponse, AppError> {
    let report = service.run(Utc::now().date_naive()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
