use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use shiftreq::database::{
    init_database,
    repositories::{
        ReminderLogRepository, RequestRepository, SettingsRepository, ShiftRepository,
        UserRepository,
    },
};
use shiftreq::handlers::{admin, requests, shifts, workers};
use shiftreq::services::{
    DeadlineService, NotificationService, ReminderService, RequestService, ShiftService,
};
use shiftreq::{Config, scheduler};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("ShiftReq API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("Starting ShiftReq API server...");

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories
    let user_repository = UserRepository::new(pool.clone());
    let request_repository = RequestRepository::new(pool.clone());
    let shift_repository = ShiftRepository::new(pool.clone());
    let settings_repository = SettingsRepository::new(pool.clone());
    let reminder_log_repository = ReminderLogRepository::new(pool.clone());

    // Services
    let notifier = NotificationService::new();
    let deadline_service = DeadlineService::new(
        settings_repository.clone(),
        user_repository.clone(),
        config.default_deadline_day,
    );
    let request_service = RequestService::new(
        request_repository.clone(),
        user_repository.clone(),
        deadline_service.clone(),
        notifier.clone(),
    );
    let shift_service = ShiftService::new(
        shift_repository.clone(),
        request_repository.clone(),
        user_repository.clone(),
    );
    let reminder_service = ReminderService::new(
        user_repository.clone(),
        request_service.clone(),
        reminder_log_repository.clone(),
        deadline_service.clone(),
        notifier.clone(),
        config.reminder_offsets.clone(),
    );

    // Daily reminder tick
    scheduler::start_reminder_job(reminder_service.clone(), config.reminder_hour);

    let user_repo_data = web::Data::new(user_repository);
    let request_service_data = web::Data::new(request_service);
    let deadline_service_data = web::Data::new(deadline_service);
    let shift_service_data = web::Data::new(shift_service);
    let reminder_service_data = web::Data::new(reminder_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(user_repo_data.clone())
            .app_data(request_service_data.clone())
            .app_data(deadline_service_data.clone())
            .app_data(shift_service_data.clone())
            .app_data(reminder_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/requests")
                            .route("", web::post().to(requests::create_request))
                            .route("", web::get().to(requests::get_requests)),
                    )
                    .service(
                        web::scope("/workers")
                            .route("", web::post().to(workers::register_user))
                            .route("", web::get().to(workers::list_users)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/requests", web::get().to(admin::list_requests))
                            .route(
                                "/requests/{id}/approve",
                                web::post().to(admin::approve_request),
                            )
                            .route(
                                "/requests/{id}/reject",
                                web::post().to(admin::reject_request),
                            )
                            .route("/settings/deadline", web::get().to(admin::get_deadline))
                            .route("/settings/deadline", web::put().to(admin::set_deadline))
                            .route(
                                "/settings/deadline/history",
                                web::get().to(admin::deadline_history),
                            )
                            .route("/shifts", web::get().to(shifts::get_shifts))
                            .route(
                                "/shifts/{date}",
                                web::put().to(shifts::replace_day_assignments),
                            )
                            .route(
                                "/shifts/{date}/conflicts",
                                web::post().to(shifts::check_day_conflicts),
                            )
                            .route("/reminders/run", web::post().to(admin::run_reminders)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
