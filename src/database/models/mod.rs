mod macros;
mod reminder;
mod request;
mod settings;
mod shift;
mod user;

pub use reminder::{ReminderLog, ReminderRunReport};
pub use request::{Request, RequestDecision, RequestDetail, RequestFilter, RequestStatus};
pub use settings::{DEADLINE_DAY_KEY, DeadlineChange, Setting};
pub use shift::{Shift, ShiftConflict, ShiftUpdate};
pub use user::{CreateUserInput, User, UserRole};
