//! The reporting engine: turns a snapshot of a user's transactions into totals,
//! a daily spending trend and plain-text insights.
//!
//! The engine functions are pure. They take the snapshot, the evaluation
//! instant and the local time as explicit arguments and never touch the
//! database or the system clock, so a report can be reproduced exactly in tests.

mod aggregation;
mod currency;
mod handlers;
mod insights;
mod range;
mod trend;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    timezone::LocalTime,
    transaction::{Transaction, TransactionKind},
};

pub use aggregation::{
    CategoryTotal, CategoryTotals, MonthlyTotals, Summary, UNCATEGORIZED_LABEL, aggregate,
    aggregate_by_month, format_month_label,
};
pub use currency::{DigitGrouping, format_currency};
pub(crate) use handlers::get_report;
pub use insights::{NO_SPENDING_MESSAGE, generate_insights};
pub use range::{RangeSelector, filter_by_range};
pub use trend::{DailyTrendPoint, build_daily_trend};

/// Settings that change how a report is presented but not what it counts.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Decides which calendar day and month an instant falls in.
    pub local_time: LocalTime,
    /// The symbol written before amounts in insights, e.g. "₹".
    pub currency_symbol: String,
}

/// Everything the client needs to render the report view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The time window the report covers.
    pub range: RangeSelector,
    /// The number of transactions in the window.
    pub transaction_count: usize,
    /// Income, expense and balance over the window.
    pub summary: Summary,
    /// The expense totals per category, largest first.
    pub category_totals: Vec<CategoryTotal>,
    /// Income and expense per month, oldest first.
    pub monthly: Vec<MonthlyTotals>,
    /// The expense total per day, oldest first.
    pub daily_trend: Vec<DailyTrendPoint>,
    /// Plain-text observations about the spending.
    pub insights: Vec<String>,
}

/// Run the whole engine over `snapshot` for the window `range` as of `now`.
pub fn build_report(
    snapshot: &[Transaction],
    range: RangeSelector,
    now: OffsetDateTime,
    settings: &ReportSettings,
) -> Report {
    let filtered = filter_by_range(snapshot, range, now, settings.local_time);
    let (expenses, incomes): (Vec<Transaction>, Vec<Transaction>) = filtered
        .iter()
        .cloned()
        .partition(|transaction| transaction.kind == TransactionKind::Expense);

    let summary = aggregate(&filtered);
    let monthly = aggregate_by_month(&filtered, settings.local_time);
    let daily_trend = build_daily_trend(&expenses, settings.local_time);
    let insights = generate_insights(
        &expenses,
        &incomes,
        &summary.category_totals,
        summary.expense_total,
        settings.local_time,
        &settings.currency_symbol,
    );

    Report {
        range,
        transaction_count: filtered.len(),
        category_totals: summary.category_totals.sorted_by_total(),
        summary,
        monthly,
        daily_trend,
        insights,
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use time::OffsetDateTime;

    use crate::{
        UserID,
        transaction::{Transaction, TransactionKind},
    };

    fn transaction(
        kind: TransactionKind,
        amount: f64,
        category: &str,
        occurred_at: Option<OffsetDateTime>,
    ) -> Transaction {
        Transaction {
            id: 0,
            owner_id: UserID::new(1),
            kind,
            amount,
            category: category.to_owned(),
            occurred_at,
            note: String::new(),
        }
    }

    pub fn expense(
        amount: f64,
        category: &str,
        occurred_at: Option<OffsetDateTime>,
    ) -> Transaction {
        transaction(TransactionKind::Expense, amount, category, occurred_at)
    }

    pub fn income(
        amount: f64,
        category: &str,
        occurred_at: Option<OffsetDateTime>,
    ) -> Transaction {
        transaction(TransactionKind::Income, amount, category, occurred_at)
    }
}
