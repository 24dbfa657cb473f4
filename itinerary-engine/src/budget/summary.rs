//! Budget aggregation.
//!
//! Pure functions over a budget and the itinerary's days. Nothing here
//! mutates the snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Budget, Day, Expense, ExpenseCategory, saturating_sum};

/// Usage percentage at which a budget enters the warning band.
const WARNING_PERCENT: u32 = 80;

/// Discrete budget health, for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    /// Under 80 % used.
    Nominal,
    /// 80 % to 100 % used.
    Warning,
    /// Over 100 % used.
    OverBudget,
}

/// Spend in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: ExpenseCategory,
    pub label: &'static str,
    pub total: Decimal,
    /// Share of the budget ceiling in percent; `None` when the ceiling is zero.
    pub share_percent: Option<Decimal>,
}

/// Spend on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    /// 1-based ordinal.
    pub day_number: u32,
    pub date: Option<NaiveDate>,
    pub expenses: Vec<Expense>,
    pub total: Decimal,
}

/// Everything a budget view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total: Decimal,
    pub currency: String,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    pub usage_percent: Decimal,
    pub status: BudgetStatus,
    pub by_category: Vec<CategoryBreakdown>,
    pub by_day: Vec<DayBreakdown>,
}

/// Compute the full summary of a budget against the itinerary's days.
pub fn summarize(budget: &Budget, days: &[Day]) -> BudgetSummary {
    let total_spent = budget.total_spent();
    let usage = usage_percent(budget.total, total_spent);

    BudgetSummary {
        total: budget.total,
        currency: budget.currency.clone(),
        total_spent,
        remaining: budget.remaining(),
        usage_percent: usage,
        status: status_for(usage),
        by_category: by_category(budget),
        by_day: by_day(budget, days),
    }
}

/// `spent / total * 100`, or zero when there is no ceiling.
///
/// Saturates at `Decimal::MAX` rather than overflowing.
pub fn usage_percent(total: Decimal, spent: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        percent_of(spent, total)
    } else {
        Decimal::ZERO
    }
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

/// Classify spend against the ceiling by usage percentage.
///
/// A zero ceiling has zero usage and so is always `Nominal`.
pub fn status(total: Decimal, spent: Decimal) -> BudgetStatus {
    status_for(usage_percent(total, spent))
}

fn status_for(usage: Decimal) -> BudgetStatus {
    if usage > Decimal::ONE_HUNDRED {
        BudgetStatus::OverBudget
    } else if usage >= Decimal::from(WARNING_PERCENT) {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Nominal
    }
}

/// Spend per category, in fixed category order, omitting empty categories.
pub fn by_category(budget: &Budget) -> Vec<CategoryBreakdown> {
    ExpenseCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let matching: Vec<&Expense> = budget
                .expenses
                .iter()
                .filter(|e| e.category == category)
                .collect();
            if matching.is_empty() {
                return None;
            }

            let total = saturating_sum(matching.iter().map(|e| e.amount));
            let share_percent =
                (budget.total > Decimal::ZERO).then(|| percent_of(total, budget.total));

            Some(CategoryBreakdown {
                category,
                label: category.label(),
                total,
                share_percent,
            })
        })
        .collect()
}

/// Spend per day. Every day appears, including days with no expenses.
pub fn by_day(budget: &Budget, days: &[Day]) -> Vec<DayBreakdown> {
    days.iter()
        .enumerate()
        .map(|(idx, day)| {
            let day_number = idx as u32 + 1;
            let expenses: Vec<Expense> = budget
                .expenses
                .iter()
                .filter(|e| e.day_number == day_number)
                .cloned()
                .collect();
            let total = saturating_sum(expenses.iter().map(|e| e.amount));

            DayBreakdown {
                day_number,
                date: day.date,
                expenses,
                total,
            }
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    /// Amounts with cent precision, up to 100k.
    fn amount() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn category() -> impl Strategy<Value = ExpenseCategory> {
        (0usize..6).prop_map(|i| ExpenseCategory::ALL[i])
    }

    fn budget_and_days() -> impl Strategy<Value = (Budget, Vec<Day>)> {
        (1usize..8, amount()).prop_flat_map(|(day_count, total)| {
            let expense = (category(), amount(), 1..=day_count as u32);
            proptest::collection::vec(expense, 0..20).prop_map(move |items| {
                let mut budget = Budget::new(total, "USD");
                budget.expenses = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, (category, amount, day_number))| Expense {
                        id: format!("e{i}"),
                        category,
                        amount,
                        description: String::new(),
                        day_number,
                        recorded_at: Utc::now(),
                    })
                    .collect();
                (budget, vec![Day::default(); day_count])
            })
        })
    }

    proptest! {
        /// Remaining plus spent is exactly the ceiling.
        #[test]
        fn remaining_plus_spent_is_total((budget, days) in budget_and_days()) {
            let s = summarize(&budget, &days);
            prop_assert_eq!(s.remaining + s.total_spent, s.total);
        }

        /// Category totals add up to total spent.
        #[test]
        fn categories_sum_to_spent((budget, days) in budget_and_days()) {
            let s = summarize(&budget, &days);
            let sum: Decimal = s.by_category.iter().map(|c| c.total).sum();
            prop_assert_eq!(sum, s.total_spent);
        }

        /// Day totals add up to total spent when every expense has a valid day.
        #[test]
        fn days_sum_to_spent((budget, days) in budget_and_days()) {
            let s = summarize(&budget, &days);
            let sum: Decimal = s.by_day.iter().map(|d| d.total).sum();
            prop_assert_eq!(sum, s.total_spent);
            prop_assert_eq!(s.by_day.len(), days.len());
        }

        /// With a ceiling, over budget means a negative remaining amount.
        /// Without one, the status stays nominal.
        #[test]
        fn over_budget_iff_negative_remaining((budget, days) in budget_and_days()) {
            let s = summarize(&budget, &days);
            if s.total > Decimal::ZERO {
                prop_assert_eq!(s.status == BudgetStatus::OverBudget, s.remaining < Decimal::ZERO);
            } else {
                prop_assert_eq!(s.status, BudgetStatus::Nominal);
            }
        }
    }
}
