use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Fallback cutoff day-of-month used until an admin stores one.
    pub default_deadline_day: u32,
    /// Days-before-deadline offsets at which reminders go out.
    pub reminder_offsets: Vec<i64>,
    /// Hour of day (0-23) at which the daily reminder job runs.
    pub reminder_hour: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://shiftreq.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            default_deadline_day: env::var("DEFAULT_DEADLINE_DAY")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            reminder_offsets: parse_offsets(
                &env::var("REMINDER_OFFSETS").unwrap_or_else(|_| "7,3,1".to_string()),
            ),
            reminder_hour: env::var("REMINDER_HOUR")
                .unwrap_or_else(|_| "9".to_string())
                .parse()
                .unwrap_or(9),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated offset list, e.g. "7,3,1". Invalid entries are
/// dropped; an empty result falls back to the stock offsets.
fn parse_offsets(raw: &str) -> Vec<i64> {
    let mut offsets: Vec<i64> = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .filter(|n| *n >= 0)
        .collect();

    if offsets.is_empty() {
        offsets = vec![7, 3, 1];
    }

    offsets.sort_unstable_by(|a, b| b.cmp(a));
    offsets.dedup();
    offsets
}
