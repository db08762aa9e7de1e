//! Validation of transactions submitted by clients.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error,
    timezone::LocalTime,
    transaction::core::{NewTransaction, TransactionKind, parse_amount_text, parse_occurred_at},
};

/// The JSON body for creating or updating a transaction.
///
/// Every field is optional at the parsing stage so that a missing field is
/// reported by [TransactionForm::validate] with a useful message instead of a
/// generic deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// Either "income" or "expense".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// A non-negative number, or a string holding one.
    #[serde(default)]
    pub amount: Value,
    /// A non-empty label such as "Food".
    #[serde(default)]
    pub category: Option<String>,
    /// An RFC 3339 timestamp, or a calendar date like "2024-01-15".
    #[serde(default)]
    pub date: Option<String>,
    /// Optional free text.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionForm {
    /// Check the submitted fields and convert them into a [NewTransaction].
    ///
    /// Calendar dates without a time are taken as midnight in `local_time`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidTransaction] naming the first field that was rejected.
    pub fn validate(self, local_time: LocalTime) -> Result<NewTransaction, Error> {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some("income") => TransactionKind::Income,
            Some("expense") => TransactionKind::Expense,
            _ => {
                return Err(Error::InvalidTransaction(
                    "type must be either \"income\" or \"expense\"".to_owned(),
                ));
            }
        };

        let amount = parse_amount(&self.amount)
            .ok_or_else(|| Error::InvalidTransaction("amount must be a number".to_owned()))?;

        if amount < 0.0 {
            return Err(Error::InvalidTransaction("amount must not be negative".to_owned()));
        }

        let category = self.category.as_deref().map(str::trim).unwrap_or_default();

        if category.is_empty() {
            return Err(Error::InvalidTransaction("category is required".to_owned()));
        }

        let occurred_at = self
            .date
            .as_deref()
            .and_then(|date| parse_occurred_at(date, local_time))
            .ok_or_else(|| {
                Error::InvalidTransaction(
                    "date must be an RFC 3339 timestamp or a YYYY-MM-DD date".to_owned(),
                )
            })?;

        let note = self.notes.as_deref().map(str::trim).unwrap_or_default();

        Ok(NewTransaction::new(kind, amount, occurred_at)
            .category(category)
            .note(note))
    }
}

/// Read an amount sent either as a JSON number or as a numeric string.
fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|amount| amount.is_finite()),
        Value::String(text) => parse_amount_text(text),
        _ => None,
    }
}
