//! Budget aggregation and the expense ledger.
//!
//! `summarize` computes totals, per-category and per-day breakdowns and a
//! discrete status. The ledger functions validate and apply expense edits.

mod error;
mod ledger;
mod summary;

pub use error::BudgetError;
pub use ledger::{ExpenseDraft, add_expense, parse_amount, remove_expense, validate_total};
pub use summary::{
    BudgetStatus, BudgetSummary, CategoryBreakdown, DayBreakdown, by_category, by_day, status,
    summarize, usage_percent,
};
