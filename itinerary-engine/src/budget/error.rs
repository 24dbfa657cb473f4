//! Budget validation errors.

use rust_decimal::Decimal;

/// Errors raised before an expense or budget change is applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BudgetError {
    /// Amount input is not a number
    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),

    /// Expense amounts must be strictly positive
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount is above the accepted ceiling
    #[error("amount exceeds the maximum of {max}")]
    AmountTooLarge { max: Decimal },

    /// Budget ceilings cannot be negative
    #[error("budget total cannot be negative")]
    NegativeTotal,

    /// Expense refers to a day the itinerary does not have
    #[error("day {day} does not exist (itinerary has {day_count} days)")]
    UnknownDay { day: u32, day_count: usize },
}
