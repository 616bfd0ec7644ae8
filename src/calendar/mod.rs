//! Calendar import and the class data model.

mod calendar_import;
mod calendar_types;
mod calendar_validation;

pub use calendar_import::*;
pub use calendar_types::*;
pub use calendar_validation::*;

/// Custom error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid time format: '{0}'. Expected HH:MM or HH:MM:SS")]
    InvalidTime(String),
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid weekday list: {0}")]
    InvalidDays(String),
    #[error("Class title cannot be empty")]
    EmptyTitle,
    #[error("End time {end} must be after start time {start}")]
    TimeOrder { start: String, end: String },
}
