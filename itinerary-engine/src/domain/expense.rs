//! Budget and expense types.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Currency used when a budget is created implicitly.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Largest amount accepted for an expense or a budget ceiling (one trillion).
///
/// Sums of many amounts at this ceiling stay far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Accommodation,
    Transport,
    Food,
    Activities,
    Shopping,
    Other,
}

impl ExpenseCategory {
    /// All categories in display order.
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Accommodation,
        ExpenseCategory::Transport,
        ExpenseCategory::Food,
        ExpenseCategory::Activities,
        ExpenseCategory::Shopping,
        ExpenseCategory::Other,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Activities => "activities",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Other => "other",
        }
    }

    /// Human-readable label, also the default expense description.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "Accommodation",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Food => "Food & Dining",
            ExpenseCategory::Activities => "Activities",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Parse a wire name. Unknown names are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub category: ExpenseCategory,
    /// Never negative.
    pub amount: Decimal,
    pub description: String,
    /// 1-based day this expense belongs to.
    pub day_number: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Spending ceiling and the expenses recorded against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub total: Decimal,
    pub currency: String,
    pub expenses: Vec<Expense>,
}

impl Budget {
    pub fn new(total: Decimal, currency: impl Into<String>) -> Self {
        Self {
            total,
            currency: currency.into(),
            expenses: Vec::new(),
        }
    }

    /// Sum of every expense, regardless of day.
    pub fn total_spent(&self) -> Decimal {
        saturating_sum(self.expenses.iter().map(|e| e.amount))
    }

    /// Ceiling minus spend. Negative when over budget.
    pub fn remaining(&self) -> Decimal {
        self.total
            .checked_sub(self.total_spent())
            .unwrap_or(Decimal::MIN)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }
}

/// Sum of amounts, clamped to `Decimal`'s range instead of overflowing.
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or(if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    })
}
