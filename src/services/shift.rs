use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::database::models::{Shift, ShiftConflict, ShiftUpdate};
use crate::database::repositories::{RequestRepository, ShiftRepository, UserRepository};
use crate::error::AppError;
use crate::services::deadline;

/// Roster reads/edits plus the advisory cross-check against approved
/// unavailability. Conflicts warn the administrator; they never block a
/// save.
#[derive(Clone)]
pub struct ShiftService {
    shifts: ShiftRepository,
    requests: RequestRepository,
    users: UserRepository,
}

impl ShiftService {
    pub fn new(shifts: ShiftRepository, requests: RequestRepository, users: UserRepository) -> Self {
        Self {
            shifts,
            requests,
            users,
        }
    }

    /// Advisory check for a single planned assignment.
    pub async fn check_assignment(
        &self,
        date: NaiveDate,
        worker_id: &str,
    ) -> Result<Option<ShiftConflict>, AppError> {
        let ids = [worker_id.to_string()];
        let conflicts = self.requests.approved_for_workers_on(date, &ids).await?;

        Ok(conflicts.into_iter().next())
    }

    /// The single check across a whole day's roster, one query.
    pub async fn check_batch(
        &self,
        date: NaiveDate,
        worker_ids: &[String],
    ) -> Result<Vec<ShiftConflict>, AppError> {
        Ok(self.requests.approved_for_workers_on(date, worker_ids).await?)
    }

    pub async fn shifts_for_month(&self, year: i32, month: u32) -> Result<Vec<Shift>, AppError> {
        let (first, last) = deadline::month_bounds(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("invalid month: {}", month)))?;

        Ok(self.shifts.in_range(first, last).await?)
    }

    pub async fn shifts_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Shift>, AppError> {
        if start > end {
            return Err(AppError::BadRequest(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        Ok(self.shifts.in_range(start, end).await?)
    }

    /// Approved unavailability per date, for the admin calendar overlay.
    pub async fn approved_unavailable_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Vec<String>>, AppError> {
        if start > end {
            return Err(AppError::BadRequest(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for (date, worker_id) in self.requests.approved_in_range(start, end).await? {
            by_date.entry(date).or_default().push(worker_id);
        }

        Ok(by_date)
    }

    /// Replace the full roster for a date: diff against the stored set,
    /// apply adds/removes in one transaction, and report conflicts for the
    /// new roster as warnings.
    pub async fn replace_assignments(
        &self,
        date: NaiveDate,
        worker_ids: &[String],
        admin_id: &str,
    ) -> Result<ShiftUpdate, AppError> {
        let admin = self
            .users
            .find_by_id(admin_id)
            .await?
            .filter(|user| user.is_admin())
            .ok_or_else(|| AppError::not_found(format!("admin {}", admin_id)))?;

        let new_ids: HashSet<String> = worker_ids.iter().cloned().collect();
        for worker_id in &new_ids {
            if self.users.find_by_id(worker_id).await?.is_none() {
                return Err(AppError::not_found(format!("worker {}", worker_id)));
            }
        }

        let current: HashSet<String> = self
            .shifts
            .for_date(date)
            .await?
            .into_iter()
            .map(|shift| shift.worker_id)
            .collect();

        let mut added: Vec<String> = new_ids.difference(&current).cloned().collect();
        let mut removed: Vec<String> = current.difference(&new_ids).cloned().collect();
        let mut kept: Vec<String> = new_ids.intersection(&current).cloned().collect();
        added.sort();
        removed.sort();
        kept.sort();

        let roster: Vec<String> = {
            let mut ids: Vec<String> = new_ids.into_iter().collect();
            ids.sort();
            ids
        };
        let conflicts = self.check_batch(date, &roster).await?;

        let shifts = self
            .shifts
            .replace_for_date(date, &added, &removed, &kept, &admin.id)
            .await?;

        for conflict in &conflicts {
            log::warn!("shift {}: {}", date, conflict.message());
        }

        Ok(ShiftUpdate {
            shifts,
            conflicts,
            added,
            removed,
        })
    }
}
