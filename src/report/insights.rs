//! Plain-text observations about a report's spending.

use std::collections::HashSet;

use crate::{
    report::{CategoryTotals, aggregation::category_label, format_currency},
    timezone::LocalTime,
    transaction::Transaction,
};

/// The only insight given for a period without expenses.
pub const NO_SPENDING_MESSAGE: &str = "No spending data for this period.";

/// Describe the spending in `expenses`.
///
/// Without expenses the result is exactly `[NO_SPENDING_MESSAGE]`. Otherwise the
/// insights are, in order: the top category, the largest single expense, the
/// average spend per day with expenses, and whether income exceeds spending.
///
/// Ties for the top category go to the first category in `category_totals`,
/// and ties for the largest expense go to the first one in `expenses`. Expenses
/// without a valid date count together as one day, and the day count is at
/// least one. Income equal to `expense_total` is not counted as saving.
pub fn generate_insights(
    expenses: &[Transaction],
    incomes: &[Transaction],
    category_totals: &CategoryTotals,
    expense_total: f64,
    local_time: LocalTime,
    currency_symbol: &str,
) -> Vec<String> {
    if expenses.is_empty() {
        return vec![NO_SPENDING_MESSAGE.to_owned()];
    }

    let mut insights = Vec::with_capacity(4);

    if let Some(top) = category_totals.top() {
        insights.push(format!(
            "Highest spending: \"{}\" → {}",
            top.category,
            format_currency(top.total, currency_symbol)
        ));
    }

    let largest = expenses.iter().fold(None::<&Transaction>, |largest, expense| match largest {
        Some(largest) if expense.amount <= largest.amount => Some(largest),
        _ => Some(expense),
    });

    if let Some(largest) = largest {
        insights.push(format!(
            "Largest single expense: {} in \"{}\"",
            format_currency(largest.amount, currency_symbol),
            category_label(&largest.category)
        ));
    }

    let spending_days = expenses
        .iter()
        .map(|expense| {
            expense
                .occurred_at
                .and_then(|occurred_at| local_time.date_of(occurred_at))
        })
        .collect::<HashSet<_>>()
        .len()
        .max(1);

    insights.push(format!(
        "Average daily spending: {}",
        format_currency(expense_total / spending_days as f64, currency_symbol)
    ));

    let income_total: f64 = incomes.iter().map(|income| income.amount).sum();

    if income_total > expense_total {
        insights.push("Income is higher than expenses, you are saving!".to_owned());
    } else {
        insights.push("Expenses exceed income, review spending.".to_owned());
    }

    insights
}
