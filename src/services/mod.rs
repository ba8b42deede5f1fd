pub mod deadline;
pub mod notifier;
pub mod reminder;
pub mod request;
pub mod shift;

pub use deadline::DeadlineService;
pub use notifier::{NotificationEvent, NotificationService};
pub use reminder::ReminderService;
pub use request::RequestService;
pub use shift::ShiftService;
