//! The per-day expense series for the spending chart.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::{
    timezone::LocalTime,
    transaction::{Transaction, TransactionKind},
};

/// The total spent on one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrendPoint {
    /// The calendar day in local time.
    pub day: Date,
    /// The sum of the day's expenses.
    pub total: f64,
}

/// Sum expenses per local calendar day, oldest day first.
///
/// Days without expenses are not filled in. Incomes and expenses without a
/// valid date are skipped.
pub fn build_daily_trend(expenses: &[Transaction], local_time: LocalTime) -> Vec<DailyTrendPoint> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    for transaction in expenses
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        let Some(day) = transaction
            .occurred_at
            .and_then(|occurred_at| local_time.date_of(occurred_at))
        else {
            continue;
        };

        *totals.entry(day).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(day, total)| DailyTrendPoint { day, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, offset};

    use crate::{
        report::test_utils::{expense, income},
        timezone::LocalTime,
    };

    use super::{DailyTrendPoint, build_daily_trend};

    #[test]
    fn empty_input_gives_empty_trend() {
        assert!(build_daily_trend(&[], LocalTime::UTC).is_empty());
    }

    #[test]
    fn sums_expenses_on_the_same_day() {
        let expenses = vec![
            expense(30.0, "Food", Some(datetime!(2024-01-15 08:00 UTC))),
            expense(70.0, "Bills", Some(datetime!(2024-01-15 19:00 UTC))),
        ];

        let trend = build_daily_trend(&expenses, LocalTime::UTC);

        assert_eq!(
            trend,
            vec![DailyTrendPoint {
                day: date!(2024-01-15),
                total: 100.0
            }]
        );
    }

    #[test]
    fn sorts_days_without_filling_gaps() {
        let expenses = vec![
            expense(5.0, "Food", Some(datetime!(2024-01-20 12:00 UTC))),
            expense(1.0, "Food", Some(datetime!(2024-01-10 12:00 UTC))),
        ];

        let trend = build_daily_trend(&expenses, LocalTime::UTC);

        let days: Vec<_> = trend.iter().map(|point| point.day).collect();
        assert_eq!(days, [date!(2024-01-10), date!(2024-01-20)]);
    }

    #[test]
    fn skips_undated_expenses_and_incomes() {
        let transactions = vec![
            expense(5.0, "Food", None),
            income(1000.0, "Salary", Some(datetime!(2024-01-10 12:00 UTC))),
            expense(2.0, "Food", Some(datetime!(2024-01-10 12:00 UTC))),
        ];

        let trend = build_daily_trend(&transactions, LocalTime::UTC);

        assert_eq!(
            trend,
            vec![DailyTrendPoint {
                day: date!(2024-01-10),
                total: 2.0
            }]
        );
    }

    #[test]
    fn buckets_by_local_day() {
        // 20:00 UTC is the next morning in India.
        let expenses = vec![
            expense(1.0, "Food", Some(datetime!(2024-01-15 10:00 UTC))),
            expense(2.0, "Food", Some(datetime!(2024-01-15 20:00 UTC))),
        ];

        let in_utc = build_daily_trend(&expenses, LocalTime::UTC);
        let in_india = build_daily_trend(&expenses, LocalTime::Fixed(offset!(+5:30)));

        assert_eq!(in_utc.len(), 1);
        assert_eq!(in_india.len(), 2);
        assert_eq!(in_india[1].day, date!(2024-01-16));
    }

    #[test]
    fn buckets_by_local_day_across_daylight_saving() {
        let auckland = LocalTime::from_timezone_name("Pacific/Auckland").unwrap();
        let expenses = vec![
            // 00:30 on Jan 16 under summer time (+13).
            expense(1.0, "Food", Some(datetime!(2024-01-15 11:30 UTC))),
            // 23:30 on Jul 15 under winter time (+12).
            expense(2.0, "Food", Some(datetime!(2024-07-15 11:30 UTC))),
        ];

        let trend = build_daily_trend(&expenses, auckland);

        let days: Vec<_> = trend.iter().map(|point| point.day).collect();
        assert_eq!(days, [date!(2024-01-16), date!(2024-07-15)]);
    }
}
