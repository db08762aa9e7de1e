//! Income, expense and category totals, and monthly buckets for the dashboard chart.
//!
//! Amounts are summed as they come; rows read from the database have already
//! been coerced to finite numbers, so the totals never become `NaN`.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Month};

use crate::{
    timezone::LocalTime,
    transaction::{Transaction, TransactionKind},
};

/// The label used for expenses whose category is empty.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The category an expense is counted under, with blank categories mapped to
/// [UNCATEGORIZED_LABEL].
pub(crate) fn category_label(category: &str) -> &str {
    let category = category.trim();

    if category.is_empty() {
        UNCATEGORIZED_LABEL
    } else {
        category
    }
}

/// The summed expenses of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The sum of the category's expenses.
    pub total: f64,
}

/// Expense totals per category, kept in the order each category was first seen.
///
/// The order is what makes ties deterministic: [CategoryTotals::top] returns
/// the earliest category among equal totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals(Vec<CategoryTotal>);

impl CategoryTotals {
    /// Create an empty set of totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `category`, appending the category if it is new.
    ///
    /// A blank `category` is counted as [UNCATEGORIZED_LABEL].
    pub fn add(&mut self, category: &str, amount: f64) {
        let category = category_label(category);

        match self.0.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => entry.total += amount,
            None => self.0.push(CategoryTotal {
                category: category.to_owned(),
                total: amount,
            }),
        }
    }

    /// The total for `category`, if any expenses were counted under it.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.total)
    }

    /// Iterate over the totals in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.0.iter()
    }

    /// The number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no categories have been counted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The category with the largest total.
    ///
    /// A later category only wins with a strictly larger total, so ties go to
    /// the category seen first.
    pub fn top(&self) -> Option<&CategoryTotal> {
        self.0.iter().fold(None, |top, entry| match top {
            Some(top) if entry.total <= top.total => Some(top),
            _ => Some(entry),
        })
    }

    /// The totals ordered from the largest to the smallest.
    ///
    /// The sort is stable, so equal totals keep their first-seen order.
    pub fn sorted_by_total(&self) -> Vec<CategoryTotal> {
        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| b.total.total_cmp(&a.total));
        sorted
    }
}

impl<'a> FromIterator<(&'a str, f64)> for CategoryTotals {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        let mut totals = Self::new();

        for (category, amount) in iter {
            totals.add(category, amount);
        }

        totals
    }
}

/// Income, expense and balance over a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all incomes.
    pub income_total: f64,
    /// The sum of all expenses.
    pub expense_total: f64,
    /// `income_total - expense_total`.
    pub balance: f64,
    /// The expense totals per category.
    pub category_totals: CategoryTotals,
}

/// Sum `transactions` by kind and sum expenses by category.
pub fn aggregate(transactions: &[Transaction]) -> Summary {
    let mut income_total = 0.0;
    let mut expense_total = 0.0;
    let mut category_totals = CategoryTotals::new();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => income_total += transaction.amount,
            TransactionKind::Expense => {
                expense_total += transaction.amount;
                category_totals.add(&transaction.category, transaction.amount);
            }
        }
    }

    Summary {
        income_total,
        expense_total,
        balance: income_total - expense_total,
        category_totals,
    }
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// The first day of the month.
    pub month: Date,
    /// The three-letter month name, e.g. "Jan".
    pub label: String,
    /// The sum of the month's incomes.
    pub income: f64,
    /// The sum of the month's expenses.
    pub expense: f64,
}

/// Bucket `transactions` by local calendar month, oldest month first.
///
/// Transactions without a valid date are skipped.
pub fn aggregate_by_month(
    transactions: &[Transaction],
    local_time: LocalTime,
) -> Vec<MonthlyTotals> {
    let mut totals: BTreeMap<Date, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let Some(month) = transaction
            .occurred_at
            .and_then(|occurred_at| local_time.date_of(occurred_at))
            .and_then(|date| date.replace_day(1).ok())
        else {
            continue;
        };

        let (income, expense) = totals.entry(month).or_insert((0.0, 0.0));

        match transaction.kind {
            TransactionKind::Income => *income += transaction.amount,
            TransactionKind::Expense => *expense += transaction.amount,
        }
    }

    totals
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotals {
            month,
            label: format_month_label(month.month()).to_owned(),
            income,
            expense,
        })
        .collect()
}

/// Formats a month as a three-letter abbreviation, e.g. "Jan".
pub fn format_month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
