mod reminder_log;
mod request;
mod settings;
mod shift;
mod user;

pub use reminder_log::ReminderLogRepository;
pub use request::RequestRepository;
pub use settings::SettingsRepository;
pub use shift::ShiftRepository;
pub use user::UserRepository;
