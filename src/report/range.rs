//! Narrows a snapshot of transactions to a named time window.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{timezone::LocalTime, transaction::Transaction};

/// A named time window for a report.
///
/// Parsed from the query values "all", "7", "30", "90" and "month". Any other
/// value selects [RangeSelector::All] so that a bad value shows everything
/// instead of failing the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum RangeSelector {
    /// Every transaction, including ones without a valid date.
    #[default]
    All,
    /// The seven days up to now.
    Last7Days,
    /// The thirty days up to now.
    Last30Days,
    /// The ninety days up to now.
    Last90Days,
    /// The current calendar month in local time.
    CurrentMonth,
}

impl RangeSelector {
    /// Parse a query value, falling back to [RangeSelector::All].
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "7" => Self::Last7Days,
            "30" => Self::Last30Days,
            "90" => Self::Last90Days,
            "month" => Self::CurrentMonth,
            _ => Self::All,
        }
    }

    /// The query value that selects this range.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Last7Days => "7",
            Self::Last30Days => "30",
            Self::Last90Days => "90",
            Self::CurrentMonth => "month",
        }
    }

    fn days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::All | Self::CurrentMonth => None,
        }
    }
}

impl From<String> for RangeSelector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RangeSelector> for &'static str {
    fn from(range: RangeSelector) -> Self {
        range.as_str()
    }
}

/// Keep the transactions in `transactions` that fall within `selector`.
///
/// `now` is the evaluation instant and `local_time` decides which calendar
/// month `now` and each transaction fall in. The rolling windows start exactly
/// N days before `now`, not at the start of that day. Every range except
/// [RangeSelector::All] drops transactions without a valid date.
pub fn filter_by_range(
    transactions: &[Transaction],
    selector: RangeSelector,
    now: OffsetDateTime,
    local_time: LocalTime,
) -> Vec<Transaction> {
    if let Some(days) = selector.days() {
        let cutoff = now - Duration::days(days);

        return transactions
            .iter()
            .filter(|transaction| {
                transaction
                    .occurred_at
                    .is_some_and(|occurred_at| occurred_at >= cutoff)
            })
            .cloned()
            .collect();
    }

    match selector {
        RangeSelector::CurrentMonth => {
            let Some(today) = local_time.date_of(now) else {
                return Vec::new();
            };

            transactions
                .iter()
                .filter(|transaction| {
                    transaction
                        .occurred_at
                        .and_then(|occurred_at| local_time.date_of(occurred_at))
                        .is_some_and(|date| {
                            date.year() == today.year() && date.month() == today.month()
                        })
                })
                .cloned()
                .collect()
        }
        _ => transactions.to_vec(),
    }
}
