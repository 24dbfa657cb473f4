//! Expense ledger mutations.
//!
//! Validation happens before anything is written: a rejected draft leaves
//! the budget exactly as it was.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Budget, Expense, ExpenseCategory, MAX_AMOUNT};

use super::error::BudgetError;

/// User input for a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub category: ExpenseCategory,
    /// Amount as typed; parsed and validated on add.
    pub amount: String,
    pub description: Option<String>,
    /// 1-based day number, if the user picked one.
    pub day_number: Option<u32>,
}

impl ExpenseDraft {
    pub fn new(category: ExpenseCategory, amount: impl Into<String>) -> Self {
        Self {
            category,
            amount: amount.into(),
            description: None,
            day_number: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn on_day(mut self, day_number: u32) -> Self {
        self.day_number = Some(day_number);
        self
    }
}

/// Parse an expense amount. Only numbers in `(0, MAX_AMOUNT]` are accepted.
pub fn parse_amount(raw: &str) -> Result<Decimal, BudgetError> {
    let trimmed = raw.trim();
    let amount = Decimal::from_str(trimmed)
        .map_err(|_| BudgetError::InvalidAmount(raw.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(BudgetError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(BudgetError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

/// Validate a budget ceiling.
pub fn validate_total(total: Decimal) -> Result<Decimal, BudgetError> {
    if total < Decimal::ZERO {
        return Err(BudgetError::NegativeTotal);
    }
    if total > MAX_AMOUNT {
        return Err(BudgetError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(total)
}

/// Validate a draft and append it to the budget.
///
/// `day_count` is the number of days in the itinerary and `active_day` the
/// 1-based day currently in view, if any. A draft without a day goes to the
/// active day, else day 1. An explicit day must exist when the itinerary has
/// days.
pub fn add_expense<'a>(
    budget: &'a mut Budget,
    draft: ExpenseDraft,
    day_count: usize,
    active_day: Option<u32>,
) -> Result<&'a Expense, BudgetError> {
    let amount = parse_amount(&draft.amount)?;

    let day_number = match draft.day_number {
        Some(day) => {
            if day_count > 0 && (day == 0 || day as usize > day_count) {
                return Err(BudgetError::UnknownDay { day, day_count });
            }
            day.max(1)
        }
        None => active_day
            .filter(|d| *d >= 1 && (day_count == 0 || *d as usize <= day_count))
            .unwrap_or(1),
    };

    let description = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| draft.category.label().to_string());

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        category: draft.category,
        amount,
        description,
        day_number,
        recorded_at: Utc::now(),
    };
    debug!(id = %expense.id, %amount, day_number, "adding expense");

    budget.expenses.push(expense);
    Ok(&budget.expenses[budget.expenses.len() - 1])
}

/// Remove an expense by id. Unknown ids are a no-op and return `None`.
pub fn remove_expense(budget: &mut Budget, id: &str) -> Option<Expense> {
    let idx = budget.expenses.iter().position(|e| e.id == id)?;
    Some(budget.expenses.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> Budget {
        Budget::new(Decimal::from(1000), "USD")
    }

    #[test]
    fn negative_amount_rejected_and_ledger_unchanged() {
        let mut b = budget();
        let before = b.clone();

        let result = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Food, "-5"), 3, None);

        assert_eq!(result.unwrap_err(), BudgetError::NonPositiveAmount);
        assert_eq!(b, before);
    }

    #[test]
    fn zero_and_non_numeric_rejected() {
        assert_eq!(parse_amount("0"), Err(BudgetError::NonPositiveAmount));
        assert_eq!(parse_amount("0.00"), Err(BudgetError::NonPositiveAmount));
        assert_eq!(
            parse_amount("ten"),
            Err(BudgetError::InvalidAmount("ten".into()))
        );
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn oversized_amount_rejected_and_ledger_unchanged() {
        let mut b = Budget::new(Decimal::ONE, "USD");
        let before = b.clone();

        let result = add_expense(
            &mut b,
            ExpenseDraft::new(ExpenseCategory::Food, "1000000000000000000000000000"),
            1,
            None,
        );

        assert_eq!(
            result.unwrap_err(),
            BudgetError::AmountTooLarge { max: MAX_AMOUNT }
        );
        assert_eq!(b, before);
        assert!(parse_amount("79228162514264337593543950335").is_err());
        assert_eq!(parse_amount("1000000000000"), Ok(MAX_AMOUNT));
    }

    #[test]
    fn amount_keeps_decimal_precision() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), Decimal::new(1250, 2));
    }

    #[test]
    fn description_defaults_to_label() {
        let mut b = budget();
        let e = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Food, "20"), 0, None).unwrap();
        assert_eq!(e.description, "Food & Dining");

        let e = add_expense(
            &mut b,
            ExpenseDraft::new(ExpenseCategory::Food, "20").with_description("   "),
            0,
            None,
        )
        .unwrap();
        assert_eq!(e.description, "Food & Dining");

        let e = add_expense(
            &mut b,
            ExpenseDraft::new(ExpenseCategory::Food, "20").with_description("Tapas"),
            0,
            None,
        )
        .unwrap();
        assert_eq!(e.description, "Tapas");
    }

    #[test]
    fn day_defaults() {
        let mut b = budget();
        let e = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Other, "1"), 3, None).unwrap();
        assert_eq!(e.day_number, 1);

        let e = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Other, "1"), 3, Some(2)).unwrap();
        assert_eq!(e.day_number, 2);

        // An active day outside the itinerary falls back to day 1
        let e = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Other, "1"), 3, Some(9)).unwrap();
        assert_eq!(e.day_number, 1);
    }

    #[test]
    fn explicit_day_must_exist() {
        let mut b = budget();
        let result = add_expense(
            &mut b,
            ExpenseDraft::new(ExpenseCategory::Other, "1").on_day(4),
            3,
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            BudgetError::UnknownDay {
                day: 4,
                day_count: 3
            }
        );
        assert!(b.expenses.is_empty());

        // Without days there is nothing to check against
        let e = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Other, "1").on_day(4), 0, None).unwrap();
        assert_eq!(e.day_number, 4);
    }

    #[test]
    fn remove_is_keyed_by_id() {
        let mut b = budget();
        let id = add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Food, "5"), 1, None)
            .unwrap()
            .id
            .clone();
        add_expense(&mut b, ExpenseDraft::new(ExpenseCategory::Food, "7"), 1, None).unwrap();

        assert!(remove_expense(&mut b, "nope").is_none());
        assert_eq!(b.expenses.len(), 2);

        let removed = remove_expense(&mut b, &id).unwrap();
        assert_eq!(removed.amount, Decimal::from(5));
        assert_eq!(b.expenses.len(), 1);
    }

    #[test]
    fn negative_total_rejected() {
        assert_eq!(validate_total(Decimal::from(-1)), Err(BudgetError::NegativeTotal));
        assert_eq!(validate_total(Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(
            validate_total(MAX_AMOUNT + Decimal::ONE),
            Err(BudgetError::AmountTooLarge { max: MAX_AMOUNT })
        );
    }
}
