use chrono::{Datelike, NaiveDate};

use crate::database::models::{DEADLINE_DAY_KEY, DeadlineChange};
use crate::database::repositories::{SettingsRepository, UserRepository};
use crate::error::AppError;

/// Year and month of the calendar month after `today`.
pub fn next_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    }
}

/// True when `target` falls inside the calendar month after `today`.
pub fn is_next_month(target: NaiveDate, today: NaiveDate) -> bool {
    let (year, month) = next_month(today);
    target.year() == year && target.month() == month
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// First and last day of a calendar month; None for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = last_day_of_month(year, month)?;
    Some((first, last))
}

/// `day` within `year`/`month`, clamped to the month's length (a day-31
/// cutoff lands on Feb 28/29).
pub fn clamp_day_to_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}

/// The submission cutoff: current day-of-month, its change history, and the
/// "is the window still open?" answer. Every check reads the then-current
/// stored value; nothing is cached across calls.
#[derive(Clone)]
pub struct DeadlineService {
    settings: SettingsRepository,
    users: UserRepository,
    default_day: u32,
}

impl DeadlineService {
    pub fn new(settings: SettingsRepository, users: UserRepository, default_day: u32) -> Self {
        Self {
            settings,
            users,
            default_day,
        }
    }

    /// The active cutoff day-of-month, falling back to the configured
    /// default when unset or unparsable.
    pub async fn deadline_day(&self) -> Result<u32, AppError> {
        let setting = self.settings.get(DEADLINE_DAY_KEY).await?;

        Ok(setting
            .and_then(|s| s.value.parse::<u32>().ok())
            .filter(|day| (1..=31).contains(day))
            .unwrap_or(self.default_day))
    }

    /// Store a new cutoff day and append a history entry. Already-decided
    /// requests are untouched; only future window checks see the change.
    pub async fn set_deadline_day(
        &self,
        day: i64,
        admin_id: &str,
    ) -> Result<DeadlineChange, AppError> {
        if !(1..=31).contains(&day) {
            return Err(AppError::InvalidDeadline(day));
        }

        let admin = self
            .users
            .find_by_id(admin_id)
            .await?
            .filter(|user| user.is_admin())
            .ok_or_else(|| AppError::not_found(format!("admin {}", admin_id)))?;

        let old_day = self
            .settings
            .get(DEADLINE_DAY_KEY)
            .await?
            .and_then(|s| s.value.parse::<i64>().ok());

        let change = self.settings.set_deadline_day(old_day, day, &admin.id).await?;

        log::info!(
            "deadline day changed {} -> {} by {}",
            old_day.map_or("unset".to_string(), |d| d.to_string()),
            day,
            admin.id
        );

        Ok(change)
    }

    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<DeadlineChange>, AppError> {
        Ok(self.settings.deadline_history(limit).await?)
    }

    /// The cutoff date within `today`'s month, clamped to the month's end
    /// when the configured day does not exist in it.
    pub async fn deadline_date_for(&self, today: NaiveDate) -> Result<NaiveDate, AppError> {
        let day = self.deadline_day().await?;

        clamp_day_to_month(today.year(), today.month(), day)
            .ok_or_else(|| AppError::internal(format!("no cutoff date for {}", today)))
    }

    /// Days from `today` to the cutoff; negative once the window is shut.
    pub async fn days_until_deadline(&self, today: NaiveDate) -> Result<i64, AppError> {
        let deadline = self.deadline_date_for(today).await?;
        Ok((deadline - today).num_days())
    }

    /// Whether a request targeting `target_date` may still be submitted on
    /// `today`. Open iff the target is in next month and today is strictly
    /// before the cutoff day; the cutoff day itself is closed.
    pub async fn is_within_window(
        &self,
        today: NaiveDate,
        target_date: NaiveDate,
    ) -> Result<bool, AppError> {
        if !is_next_month(target_date, today) {
            return Ok(false);
        }

        let deadline_day = self.deadline_day().await?;
        Ok(today.day() < deadline_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_month_rolls_over_the_year() {
        assert_eq!(next_month(date(2024, 1, 15)), (2024, 2));
        assert_eq!(next_month(date(2024, 12, 31)), (2025, 1));
    }

    #[test]
    fn is_next_month_rejects_same_and_far_months() {
        let today = date(2024, 1, 9);
        assert!(is_next_month(date(2024, 2, 1), today));
        assert!(is_next_month(date(2024, 2, 29), today));
        assert!(!is_next_month(date(2024, 1, 31), today));
        assert!(!is_next_month(date(2024, 3, 1), today));
        assert!(!is_next_month(date(2023, 2, 15), today));
    }

    #[test]
    fn is_next_month_handles_december() {
        let today = date(2024, 12, 5);
        assert!(is_next_month(date(2025, 1, 10), today));
        assert!(!is_next_month(date(2024, 12, 20), today));
    }

    #[test]
    fn clamp_handles_short_months() {
        assert_eq!(clamp_day_to_month(2024, 2, 31), Some(date(2024, 2, 29)));
        assert_eq!(clamp_day_to_month(2023, 2, 31), Some(date(2023, 2, 28)));
        assert_eq!(clamp_day_to_month(2024, 4, 31), Some(date(2024, 4, 30)));
        assert_eq!(clamp_day_to_month(2024, 1, 31), Some(date(2024, 1, 31)));
    }

    #[test]
    fn month_bounds_cover_the_whole_month() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(month_bounds(2024, 13), None);
    }
}
