use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::services::ReminderService;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Seconds from `now` until the next occurrence of `hour`:00:00 UTC.
pub fn secs_until_next_run(now: DateTime<Utc>, hour: u32) -> u64 {
    let hour = hour.min(23);
    let today_run = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("hour is clamped to 0..=23")
        .and_utc();

    let next_run = if today_run > now {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };

    (next_run - now).num_seconds().max(0) as u64
}

/// Spawn the daily reminder tick: sleep to the configured hour, then fire
/// `ReminderService::run` every 24h. The run itself is idempotent, so an
/// extra tick after a restart is harmless. Errors are logged and the loop
/// keeps going.
pub fn start_reminder_job(service: ReminderService, hour: u32) {
    tokio::spawn(async move {
        let delay = secs_until_next_run(Utc::now(), hour);
        log::info!(
            "reminder job scheduled: first run in {}s, then every 24h",
            delay
        );
        tokio::time::sleep(Duration::from_secs(delay)).await;

        let mut daily = tokio::time::interval(Duration::from_secs(DAY_SECS));
        loop {
            daily.tick().await;

            let today = Utc::now().date_naive();
            match service.run(today).await {
                Ok(report) => {
                    if report.offset.is_some() {
                        log::info!("daily reminder run for {}: {} sent", today, report.sent);
                    }
                }
                Err(err) => log::error!("daily reminder run for {} failed: {}", today, err),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn delay_until_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 6, 30, 0).unwrap();
        assert_eq!(secs_until_next_run(now, 9), 2 * 3600 + 1800);
    }

    #[test]
    fn delay_rolls_to_tomorrow_at_or_after_the_hour() {
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 9, 0, 0).unwrap();
        assert_eq!(secs_until_next_run(now, 9), DAY_SECS);

        let now = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 0).unwrap();
        assert_eq!(secs_until_next_run(now, 9), 9 * 3600 + 60);
    }

    #[test]
    fn out_of_range_hour_is_clamped() {
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 22, 0, 0).unwrap();
        assert_eq!(secs_until_next_run(now, 99), 3600);
    }
}
