use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::database::models::RequestStatus;
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::RequestService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestInput {
    /// External chat identity of the submitting worker.
    pub chat_id: String,
    /// Display name as reported by the chat layer; used on first contact.
    #[serde(default)]
    pub name: Option<String>,
    pub request_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct WorkerRequestsQuery {
    pub chat_id: String,
    pub status: Option<String>,
}

/// Chat-inbound submission. The worker record is created on first contact.
pub async fn create_request(
    users: web::Data<UserRepository>,
    service: web::Data<RequestService>,
    input: web::Json<CreateRequestInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let name = input.name.unwrap_or_default();

    let worker = users
        .find_or_create_by_chat_id(&input.chat_id, &name)
        .await?;

    let today = Utc::now().date_naive();
    let request = service.submit(&worker.id, input.request_date, today).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// A worker's own request history, newest target date first
pub async fn get_requests(
    users: web::Data<UserRepository>,
    service: web::Data<RequestService>,
    query: web::Query<WorkerRequestsQuery>,
) -> Result<HttpResponse, AppError> {
    let worker = users
        .find_by_chat_id(&query.chat_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("worker {}", query.chat_id)))?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<RequestStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let requests = service.list_for_worker(&worker.id, status).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}
