use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::ShiftService;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterInput {
    pub worker_ids: Vec<String>,
    pub admin_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckInput {
    pub worker_ids: Vec<String>,
}

/// A month's shifts plus the approved-unavailability overlay
pub async fn get_shifts(
    service: web::Data<ShiftService>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let shifts = service.shifts_for_month(year, month).await?;
    let (first, last) = crate::services::deadline::month_bounds(year, month)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month: {}", month)))?;
    let unavailable = service.approved_unavailable_days(first, last).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "shifts": shifts,
        "unavailable": unavailable,
    }))))
}

/// Replace one day's roster. Conflicts come back as warnings; the save is
/// never blocked by them.
pub async fn replace_day_assignments(
    service: web::Data<ShiftService>,
    path: web::Path<NaiveDate>,
    input: web::Json<RosterInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let update = service
        .replace_assignments(path.into_inner(), &input.worker_ids, &input.admin_id)
        .await?;

    let warnings: Vec<String> = update.conflicts.iter().map(|c| c.message()).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "shifts": update.shifts,
        "conflicts": update.conflicts,
        "warnings": warnings,
        "added": update.added,
        "removed": update.removed,
    }))))
}

/// Dry-run conflict check for a roster being edited
pub async fn check_day_conflicts(
    service: web::Data<ShiftService>,
    path: web::Path<NaiveDate>,
    input: web::Json<ConflictCheckInput>,
) -> Result<HttpResponse, AppError> {
    let conflicts = service
        .check_batch(path.into_inner(), &input.worker_ids)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(conflicts)))
}
