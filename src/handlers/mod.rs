pub mod admin;
pub mod requests;
pub mod shared;
pub mod shifts;
pub mod workers;
