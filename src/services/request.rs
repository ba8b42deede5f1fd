use chrono::{Datelike, NaiveDate, Utc};

use crate::database::models::{
    Request, RequestDecision, RequestDetail, RequestFilter, RequestStatus,
};
use crate::database::repositories::{RequestRepository, UserRepository};
use crate::error::{AppError, is_unique_violation};
use crate::services::deadline::{self, DeadlineService};
use crate::services::notifier::{NotificationEvent, NotificationService};

/// The request state machine: submission with duplicate/deadline/target
/// validation, the single terminal decision, and the listings both surfaces
/// read from.
#[derive(Clone)]
pub struct RequestService {
    requests: RequestRepository,
    users: UserRepository,
    deadline: DeadlineService,
    notifier: NotificationService,
}

impl RequestService {
    pub fn new(
        requests: RequestRepository,
        users: UserRepository,
        deadline: DeadlineService,
        notifier: NotificationService,
    ) -> Self {
        Self {
            requests,
            users,
            deadline,
            notifier,
        }
    }

    /// Submit a "cannot work" request for one date in next month.
    ///
    /// `today` is injected by the caller so the window check is
    /// deterministic and always evaluated against the then-current cutoff.
    pub async fn submit(
        &self,
        worker_id: &str,
        request_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Request, AppError> {
        let worker = self
            .users
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("worker {}", worker_id)))?;

        if !deadline::is_next_month(request_date, today) {
            return Err(AppError::InvalidTargetDate {
                date: request_date,
                today,
            });
        }

        if !self.deadline.is_within_window(today, request_date).await? {
            return Err(AppError::DeadlineExceeded {
                deadline_day: self.deadline.deadline_day().await?,
                today,
            });
        }

        // Friendly-path duplicate check; the partial unique index is the
        // real guard and wins any check-then-insert race.
        if let Some(existing) = self.requests.find_active(&worker.id, request_date).await? {
            return Err(AppError::DuplicateRequest {
                date: request_date,
                status: existing.status,
            });
        }

        let request = match self.requests.insert(&worker.id, request_date).await {
            Ok(request) => request,
            Err(err) if is_unique_violation(&err) => {
                // A concurrent submit won the insert.
                let status = self
                    .requests
                    .find_active(&worker.id, request_date)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(RequestStatus::Pending);
                return Err(AppError::DuplicateRequest {
                    date: request_date,
                    status,
                });
            }
            Err(err) => return Err(err.into()),
        };

        log::info!(
            "request {} created: worker={} date={}",
            request.id,
            worker.id,
            request.request_date
        );

        // Confirmation is fire-and-forget; the request stands regardless.
        self.notifier
            .dispatch_best_effort(NotificationEvent::confirmed(&worker, &request));

        Ok(request)
    }

    /// Apply an admin decision. The repository's conditional update only
    /// matches pending rows, so of two racing decisions exactly one wins
    /// and the other observes `AlreadyDecided`.
    pub async fn decide(
        &self,
        request_id: &str,
        decision: RequestDecision,
        admin_id: &str,
    ) -> Result<Request, AppError> {
        let admin = self
            .users
            .find_by_id(admin_id)
            .await?
            .filter(|user| user.is_admin())
            .ok_or_else(|| AppError::not_found(format!("admin {}", admin_id)))?;

        let decided = self
            .requests
            .decide_if_pending(request_id, decision.target_status(), &admin.id, Utc::now())
            .await?;

        let request = match decided {
            Some(request) => request,
            None => {
                // Zero rows matched: either the id is unknown or someone
                // else already decided it.
                return match self.requests.find_by_id(request_id).await? {
                    Some(existing) => Err(AppError::AlreadyDecided {
                        status: existing.status,
                    }),
                    None => Err(AppError::not_found(format!("request {}", request_id))),
                };
            }
        };

        log::info!(
            "request {} {} by {}",
            request.id,
            request.status,
            admin.id
        );

        if let Some(worker) = self.users.find_by_id(&request.worker_id).await? {
            self.notifier
                .dispatch_best_effort(NotificationEvent::decided(&worker, &request));
        }

        Ok(request)
    }

    pub async fn get(&self, request_id: &str) -> Result<Request, AppError> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("request {}", request_id)))
    }

    /// A worker's own requests, newest target date first.
    pub async fn list_for_worker(
        &self,
        worker_id: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, AppError> {
        let worker = self
            .users
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("worker {}", worker_id)))?;

        Ok(self.requests.list_for_worker(&worker.id, status).await?)
    }

    /// Admin listing. Pending entries always sort ahead of decided ones so
    /// unresolved work is on top regardless of filters.
    pub async fn list_all(&self, filter: &RequestFilter) -> Result<Vec<RequestDetail>, AppError> {
        let date_range = match filter.month {
            Some(month) => {
                let year = filter.year.unwrap_or_else(|| Utc::now().date_naive().year());
                let bounds = deadline::month_bounds(year, month).ok_or_else(|| {
                    AppError::BadRequest(format!("invalid month filter: {}", month))
                })?;
                Some(bounds)
            }
            None => None,
        };

        Ok(self.requests.list_detailed(filter, date_range).await?)
    }

    /// True iff the worker holds at least one non-rejected request for the
    /// given month. Used by the reminder engine to skip workers who are
    /// already covered.
    pub async fn has_submitted(
        &self,
        worker_id: &str,
        year: i32,
        month: u32,
    ) -> Result<bool, AppError> {
        let (first, last) = deadline::month_bounds(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("invalid month: {}", month)))?;

        Ok(self
            .requests
            .has_non_rejected_in_range(worker_id, first, last)
            .await?)
    }
}
