#![allow(dead_code)]

use actix_web::{App, web};
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;
use tokio::sync::mpsc::UnboundedReceiver;

use shiftreq::database::models::*;
use shiftreq::database::repositories::{
    ReminderLogRepository, RequestRepository, SettingsRepository, ShiftRepository, UserRepository,
};
use shiftreq::handlers;
use shiftreq::services::{
    DeadlineService, NotificationEvent, NotificationService, ReminderService, RequestService,
    ShiftService,
};

pub const DEFAULT_DEADLINE_DAY: u32 = 10;
pub const DEFAULT_OFFSETS: [i64; 3] = [7, 3, 1];

/// Isolated on-disk SQLite database with the full schema applied
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_file: NamedTempFile,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let database_url = format!("sqlite:{}", temp_file.path().display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(TestDb {
            pool,
            _temp_file: temp_file,
        })
    }
}

/// The wired domain core plus a captured notification outbox, so tests can
/// assert on exactly what would have been delivered.
pub struct TestCore {
    pub db: TestDb,
    pub users: UserRepository,
    pub request_repo: RequestRepository,
    pub shift_repo: ShiftRepository,
    pub reminder_logs: ReminderLogRepository,
    pub deadline: DeadlineService,
    pub requests: RequestService,
    pub reminders: ReminderService,
    pub shifts: ShiftService,
    pub outbox: UnboundedReceiver<NotificationEvent>,
}

impl TestCore {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let (notifier, outbox) = NotificationService::channel();

        let users = UserRepository::new(db.pool.clone());
        let request_repo = RequestRepository::new(db.pool.clone());
        let shift_repo = ShiftRepository::new(db.pool.clone());
        let settings_repo = SettingsRepository::new(db.pool.clone());
        let reminder_logs = ReminderLogRepository::new(db.pool.clone());

        let deadline = DeadlineService::new(
            settings_repo.clone(),
            users.clone(),
            DEFAULT_DEADLINE_DAY,
        );
        let requests = RequestService::new(
            request_repo.clone(),
            users.clone(),
            deadline.clone(),
            notifier.clone(),
        );
        let shifts = ShiftService::new(shift_repo.clone(), request_repo.clone(), users.clone());
        let reminders = ReminderService::new(
            users.clone(),
            requests.clone(),
            reminder_logs.clone(),
            deadline.clone(),
            notifier,
            DEFAULT_OFFSETS.to_vec(),
        );

        Ok(TestCore {
            db,
            users,
            request_repo,
            shift_repo,
            reminder_logs,
            deadline,
            requests,
            reminders,
            shifts,
            outbox,
        })
    }

    pub async fn seed_admin(&self, name: &str) -> User {
        self.users
            .create(CreateUserInput {
                chat_id: format!("chat-admin-{}", name),
                name: name.to_string(),
                role: Some(UserRole::Admin),
            })
            .await
            .expect("failed to seed admin")
    }

    pub async fn seed_worker(&self, name: &str) -> User {
        self.users
            .create(CreateUserInput {
                chat_id: format!("chat-worker-{}", name),
                name: name.to_string(),
                role: Some(UserRole::Worker),
            })
            .await
            .expect("failed to seed worker")
    }

    /// Everything dispatched since the last drain
    pub fn drain_events(&mut self) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.outbox.try_recv() {
            events.push(event);
        }
        events
    }

    /// Simulate the dispatcher being gone: subsequent dispatches fail
    pub fn close_outbox(&mut self) {
        self.outbox.close();
        // Drop anything buffered before the close.
        self.drain_events();
    }

    /// Actix app over the same wiring, for handler-level tests
    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.users.clone()))
            .app_data(web::Data::new(self.requests.clone()))
            .app_data(web::Data::new(self.deadline.clone()))
            .app_data(web::Data::new(self.shifts.clone()))
            .app_data(web::Data::new(self.reminders.clone()))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/requests")
                            .route("", web::post().to(handlers::requests::create_request))
                            .route("", web::get().to(handlers::requests::get_requests)),
                    )
                    .service(
                        web::scope("/workers")
                            .route("", web::post().to(handlers::workers::register_user))
                            .route("", web::get().to(handlers::workers::list_users)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/requests", web::get().to(handlers::admin::list_requests))
                            .route(
                                "/requests/{id}/approve",
                                web::post().to(handlers::admin::approve_request),
                            )
                            .route(
                                "/requests/{id}/reject",
                                web::post().to(handlers::admin::reject_request),
                            )
                            .route(
                                "/settings/deadline",
                                web::get().to(handlers::admin::get_deadline),
                            )
                            .route(
                                "/settings/deadline",
                                web::put().to(handlers::admin::set_deadline),
                            )
                            .route(
                                "/settings/deadline/history",
                                web::get().to(handlers::admin::deadline_history),
                            )
                            .route("/shifts", web::get().to(handlers::shifts::get_shifts))
                            .route(
                                "/shifts/{date}",
                                web::put().to(handlers::shifts::replace_day_assignments),
                            )
                            .route(
                                "/shifts/{date}/conflicts",
                                web::post().to(handlers::shifts::check_day_conflicts),
                            )
                            .route(
                                "/reminders/run",
                                web::post().to(handlers::admin::run_reminders),
                            ),
                    ),
            )
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}
