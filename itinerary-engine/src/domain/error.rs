//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from API/IO errors.

use chrono::NaiveDate;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Date range ends before it starts
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Day index is out of bounds for the itinerary
    #[error("no day at index {0}")]
    InvalidDayIndex(usize),

    /// Stop index is out of bounds for the day
    #[error("no stop at index {stop} on day {day}")]
    InvalidStopIndex { day: usize, stop: usize },

    /// A day with stops or expenses cannot be removed
    #[error("day {0} still has stops or expenses")]
    DayNotEmpty(u32),
}
