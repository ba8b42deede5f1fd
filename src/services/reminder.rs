use chrono::NaiveDate;

use crate::database::models::{ReminderRunReport, User};
use crate::database::repositories::{ReminderLogRepository, UserRepository};
use crate::error::AppError;
use crate::services::deadline::{self, DeadlineService};
use crate::services::notifier::{NotificationEvent, NotificationService};
use crate::services::request::RequestService;

/// Daily-triggered nudge engine. A run is a pure function of `today` plus
/// persisted state (requests + reminder logs), so an at-least-once trigger
/// can fire it as often as it likes.
#[derive(Clone)]
pub struct ReminderService {
    users: UserRepository,
    requests: RequestService,
    logs: ReminderLogRepository,
    deadline: DeadlineService,
    notifier: NotificationService,
    offsets: Vec<i64>,
}

enum Outcome {
    Sent,
    Skipped,
}

impl ReminderService {
    pub fn new(
        users: UserRepository,
        requests: RequestService,
        logs: ReminderLogRepository,
        deadline: DeadlineService,
        notifier: NotificationService,
        offsets: Vec<i64>,
    ) -> Self {
        Self {
            users,
            requests,
            logs,
            deadline,
            notifier,
            offsets,
        }
    }

    /// Send reminders due on `today` to every worker without a submission
    /// for next month. Off-schedule days are a no-op.
    pub async fn run(&self, today: NaiveDate) -> Result<ReminderRunReport, AppError> {
        let days_until = self.deadline.days_until_deadline(today).await?;

        if days_until < 0 || !self.offsets.contains(&days_until) {
            log::debug!(
                "no reminder due: {} day(s) until deadline, offsets {:?}",
                days_until,
                self.offsets
            );
            return Ok(ReminderRunReport::default());
        }

        let deadline_date = self.deadline.deadline_date_for(today).await?;
        let (target_year, target_month) = deadline::next_month(today);

        let workers = self.users.list_workers().await?;
        let mut report = ReminderRunReport {
            offset: Some(days_until),
            workers_considered: workers.len(),
            ..Default::default()
        };

        for worker in &workers {
            // One worker's failure must not starve the rest of the loop.
            match self
                .remind_worker(worker, deadline_date, days_until, target_year, target_month)
                .await
            {
                Ok(Outcome::Sent) => report.sent += 1,
                Ok(Outcome::Skipped) => report.already_sent += 1,
                Err(err) => {
                    report.failed += 1;
                    log::error!("reminder for worker {} failed: {}", worker.id, err);
                }
            }
        }

        log::info!(
            "reminder run for {}-{:02} at offset {}: {} sent, {} skipped, {} failed of {}",
            target_year,
            target_month,
            days_until,
            report.sent,
            report.already_sent,
            report.failed,
            report.workers_considered
        );

        Ok(report)
    }

    async fn remind_worker(
        &self,
        worker: &User,
        deadline_date: NaiveDate,
        days_until: i64,
        target_year: i32,
        target_month: u32,
    ) -> Result<Outcome, AppError> {
        if self
            .requests
            .has_submitted(&worker.id, target_year, target_month)
            .await?
        {
            return Ok(Outcome::Skipped);
        }

        if self
            .logs
            .exists(&worker.id, target_year as i64, target_month as i64, days_until)
            .await?
        {
            return Ok(Outcome::Skipped);
        }

        let event = NotificationEvent::ReminderDue {
            chat_id: worker.chat_id.clone(),
            worker_name: worker.name.clone(),
            deadline_date,
            days_until_deadline: days_until,
            target_year: target_year as i64,
            target_month: target_month as i64,
        };

        // The log row goes in only after the dispatcher accepted the event.
        // A crash in between re-sends at most once on the next run; the
        // unique index keeps a concurrent retry from double-recording.
        self.notifier.dispatch(event)?;

        let recorded = self
            .logs
            .record(&worker.id, target_year as i64, target_month as i64, days_until)
            .await?;

        if recorded {
            Ok(Outcome::Sent)
        } else {
            Ok(Outcome::Skipped)
        }
    }
}
