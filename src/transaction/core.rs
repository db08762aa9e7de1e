//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Value};
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{Error, UserID, timezone::LocalTime};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The string used to store the kind in the database and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parse a kind read back from the database.
    ///
    /// Anything other than "income" is counted as an expense.
    fn from_stored(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("income") {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions read from the database have already been coerced: `amount` is
/// always finite, and `occurred_at` is `None` when the stored date could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    #[serde(rename = "user_id")]
    pub owner_id: UserID,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money earned or spent, never negative.
    pub amount: f64,
    /// A free text label such as "Food".
    pub category: String,
    /// When the transaction happened.
    #[serde(rename = "date", with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
    /// Optional free text, empty when not given.
    #[serde(rename = "notes")]
    pub note: String,
}

/// A validated transaction that is ready to be stored.
///
/// To create a `NewTransaction` from client input, use
/// [TransactionForm::validate](crate::transaction::TransactionForm::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// A finite, non-negative amount.
    pub amount: f64,
    /// A non-empty category label.
    pub category: String,
    /// When the transaction happened.
    pub occurred_at: OffsetDateTime,
    /// Free text, may be empty.
    pub note: String,
}

impl NewTransaction {
    /// Create a new transaction with an empty category and note.
    pub fn new(kind: TransactionKind, amount: f64, occurred_at: OffsetDateTime) -> Self {
        Self {
            kind,
            amount,
            category: String::new(),
            occurred_at,
            note: String::new(),
        }
    }

    /// Set the category of the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the note of the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_owned();
        self
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Parse an amount written as text, e.g. "12.50".
///
/// Returns `None` for text that is not a finite number.
pub(crate) fn parse_amount_text(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Convert a stored amount into a finite number.
///
/// Legacy rows may hold text or NULL in the amount column; anything that is
/// not a finite number counts as zero.
fn coerce_stored_amount(value: Value) -> f64 {
    match value {
        Value::Integer(amount) => amount as f64,
        Value::Real(amount) if amount.is_finite() => amount,
        Value::Text(text) => parse_amount_text(&text).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parse a date written either as RFC 3339 (e.g. "2024-01-15T09:30:00Z") or as a
/// plain calendar date (e.g. "2024-01-15").
///
/// Plain dates are taken as midnight in `date_only_time`.
pub(crate) fn parse_occurred_at(
    text: &str,
    date_only_time: LocalTime,
) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date_only_time.assume_local(date.midnight()))
}

/// Format an instant for storage, normalized to UTC.
fn format_occurred_at(occurred_at: OffsetDateTime) -> Result<String, Error> {
    occurred_at
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidTransaction(format!("date cannot be stored: {error}")))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table.
///
/// The amount column keeps SQLite's flexible typing so that rows written by
/// older clients with malformed amounts can still be read and coerced.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                amount REAL,
                category TEXT NOT NULL DEFAULT '',
                note TEXT NOT NULL DEFAULT '',
                occurred_at TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, occurred_at)",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `owner_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    owner_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let occurred_at = format_occurred_at(new_transaction.occurred_at)?;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, note, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, kind, amount, category, note, occurred_at",
        )?
        .query_row(
            (
                owner_id.as_i64(),
                new_transaction.kind.as_str(),
                new_transaction.amount,
                new_transaction.category,
                new_transaction.note,
                occurred_at,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `owner_id`'s transactions, newest first.
///
/// Transactions whose date is missing or cannot be parsed are listed last.
/// Transactions at the same instant are listed newest ID first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    owner_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = connection
        .prepare(
            "SELECT id, user_id, kind, amount, category, note, occurred_at
             FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &owner_id.as_i64())], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    // Sorted after parsing since stored dates may be malformed text. `None`
    // orders before `Some`, so reversing puts undated rows last.
    transactions.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    Ok(transactions)
}

/// Retrieve a single transaction owned by `owner_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not exist or belongs to another
/// user, or an [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    owner_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, amount, category, note, occurred_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &owner_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Replace the fields of the transaction `id` owned by `owner_id`.
///
/// # Errors
/// Returns an [Error::UpdateMissingTransaction] if `id` does not exist or
/// belongs to another user, or an [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    owner_id: UserID,
    id: TransactionId,
    update: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let occurred_at = format_occurred_at(update.occurred_at)?;

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET kind = ?1, amount = ?2, category = ?3, note = ?4, occurred_at = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING id, user_id, kind, amount, category, note, occurred_at",
        )?
        .query_row(
            (
                update.kind.as_str(),
                update.amount,
                update.category,
                update.note,
                occurred_at,
                id,
                owner_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id` owned by `owner_id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if `id` does not exist or
/// belongs to another user, or an [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    owner_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Map a database row to a [Transaction], coercing malformed amounts and dates.
///
/// Expects the columns `id, user_id, kind, amount, category, note, occurred_at`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let amount: Value = row.get(3)?;
    let category: Option<String> = row.get(4)?;
    let note: Option<String> = row.get(5)?;
    let occurred_at: Option<String> = row.get(6)?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        kind: TransactionKind::from_stored(&kind),
        amount: coerce_stored_amount(amount),
        category: category.unwrap_or_default(),
        occurred_at: occurred_at.and_then(|text| parse_occurred_at(&text, LocalTime::UTC)),
        note: note.unwrap_or_default(),
    })
}


#[cfg(test)]
mod tests {
    use rusqlite::types::Value;
    use time::{
        UtcOffset,
        macros::{datetime, offset},
    };

    use super::{
        NewTransaction, TransactionKind, coerce_stored_amount, create_transaction,
        delete_transaction, get_transaction, get_transactions, parse_amount_text,
        parse_occurred_at, test_utils::*, update_transaction,
    };
    use crate::{Error, UserID, timezone::LocalTime};

    #[test]
    fn parse_amount_text_accepts_numbers() {
        assert_eq!(parse_amount_text("12.5"), Some(12.5));
        assert_eq!(parse_amount_text(" 100 "), Some(100.0));
    }

    #[test]
    fn parse_amount_text_rejects_non_numbers() {
        assert_eq!(parse_amount_text("abc"), None);
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount_text("NaN"), None);
        assert_eq!(parse_amount_text("inf"), None);
    }

    #[test]
    fn coerce_stored_amount_treats_malformed_values_as_zero() {
        assert_eq!(coerce_stored_amount(Value::Text("abc".to_owned())), 0.0);
        assert_eq!(coerce_stored_amount(Value::Null), 0.0);
        assert_eq!(coerce_stored_amount(Value::Blob(vec![1, 2])), 0.0);
        assert_eq!(coerce_stored_amount(Value::Real(f64::NAN)), 0.0);
    }

    #[test]
    fn coerce_stored_amount_keeps_numbers() {
        assert_eq!(coerce_stored_amount(Value::Integer(42)), 42.0);
        assert_eq!(coerce_stored_amount(Value::Real(4.25)), 4.25);
        assert_eq!(coerce_stored_amount(Value::Text("7.5".to_owned())), 7.5);
    }

    #[test]
    fn parse_occurred_at_reads_rfc3339() {
        let parsed = parse_occurred_at("2024-01-15T09:30:00+05:30", LocalTime::UTC);

        assert_eq!(parsed, Some(datetime!(2024-01-15 09:30 +05:30)));
    }

    #[test]
    fn parse_occurred_at_reads_plain_dates_at_local_midnight() {
        let parsed = parse_occurred_at("2024-01-15", LocalTime::Fixed(offset!(+5:30)));

        assert_eq!(parsed, Some(datetime!(2024-01-15 00:00 +05:30)));
    }

    #[test]
    fn parse_occurred_at_uses_offset_in_effect_on_plain_date() {
        let auckland = LocalTime::from_timezone_name("Pacific/Auckland").unwrap();

        let summer = parse_occurred_at("2024-01-15", auckland);
        let winter = parse_occurred_at("2024-07-15", auckland);

        assert_eq!(summer, Some(datetime!(2024-01-15 00:00 +13)));
        assert_eq!(winter, Some(datetime!(2024-07-15 00:00 +12)));
    }

    #[test]
    fn parse_occurred_at_rejects_garbage() {
        assert_eq!(parse_occurred_at("not a date", LocalTime::UTC), None);
        assert_eq!(parse_occurred_at("2024-13-45", LocalTime::UTC), None);
    }

    #[test]
    fn create_transaction_returns_stored_transaction() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let occurred_at = datetime!(2024-01-15 09:30 UTC);

        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 12.5, occurred_at)
                .category("Food")
                .note("Lunch"),
            &conn,
        )
        .unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.owner_id, user.id);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.note, "Lunch");
        assert_eq!(transaction.occurred_at, Some(occurred_at));
    }

    #[test]
    fn create_transaction_normalizes_offset_but_keeps_instant() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let occurred_at = datetime!(2024-01-15 09:30 +05:30);

        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Income, 1.0, occurred_at),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.occurred_at, Some(occurred_at));
        assert_eq!(
            transaction.occurred_at.unwrap().offset(),
            UtcOffset::UTC
        );
    }

    #[test]
    fn get_transactions_is_scoped_by_owner_and_sorted_newest_first() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let other_user = create_test_user("other@test.com", &conn);
        let older = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 2.0, datetime!(2024-02-01 00:00 UTC)),
            &conn,
        )
        .unwrap();
        create_transaction(
            other_user.id,
            NewTransaction::new(TransactionKind::Expense, 3.0, datetime!(2024-03-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions(user.id, &conn).unwrap();

        assert_eq!(transactions, vec![newer, older]);
    }

    #[test]
    fn get_transactions_tolerates_malformed_legacy_rows() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        conn.execute(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, note, occurred_at)
             VALUES (?1, 'expense', 'abc', 'Food', '', 'yesterday-ish')",
            (user.id.as_i64(),),
        )
        .unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, occurred_at)
             VALUES (?1, 'refund', NULL, 'Misc', NULL)",
            (user.id.as_i64(),),
        )
        .unwrap();

        let transactions = get_transactions(user.id, &conn).unwrap();

        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().all(|transaction| transaction.amount == 0.0));
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.occurred_at.is_none())
        );
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.kind == TransactionKind::Expense)
        );
    }

    #[test]
    fn get_transactions_lists_unparsable_dates_last() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        // Text sorts after any RFC 3339 date, so SQL ordering alone would put it first.
        conn.execute(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, occurred_at)
             VALUES (?1, 'expense', 1.0, 'Food', 'garbage')",
            (user.id.as_i64(),),
        )
        .unwrap();
        let older = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 2.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 3.0, datetime!(2024-02-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions(user.id, &conn).unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0], newer);
        assert_eq!(transactions[1], older);
        assert_eq!(transactions[2].occurred_at, None);
    }

    #[test]
    fn get_transactions_lists_same_instant_newest_id_first() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let occurred_at = datetime!(2024-01-01 00:00 UTC);
        let first = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, occurred_at),
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 2.0, occurred_at),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions(user.id, &conn).unwrap();

        assert_eq!(transactions, vec![second, first]);
    }

    #[test]
    fn get_transaction_hides_other_users_transactions() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let other_user = create_test_user("other@test.com", &conn);
        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        assert_eq!(
            get_transaction(user.id, transaction.id, &conn),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_transaction(other_user.id, transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_transaction_replaces_fields() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            user.id,
            transaction.id,
            NewTransaction::new(TransactionKind::Income, 99.0, datetime!(2024-01-02 00:00 UTC))
                .category("Salary"),
            &conn,
        )
        .unwrap();

        assert_eq!(updated.id, transaction.id);
        assert_eq!(updated.kind, TransactionKind::Income);
        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.category, "Salary");
        assert_eq!(get_transaction(user.id, transaction.id, &conn), Ok(updated));
    }

    #[test]
    fn update_transaction_fails_for_other_owner() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            UserID::new(user.id.as_i64() + 1),
            transaction.id,
            NewTransaction::new(TransactionKind::Expense, 5.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(get_transaction(user.id, transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn delete_transaction_removes_row() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);
        let transaction = create_transaction(
            user.id,
            NewTransaction::new(TransactionKind::Expense, 1.0, datetime!(2024-01-01 00:00 UTC)),
            &conn,
        )
        .unwrap();

        delete_transaction(user.id, transaction.id, &conn).unwrap();

        assert_eq!(
            get_transaction(user.id, transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let conn = get_test_connection();
        let user = create_test_user("test@test.com", &conn);

        let result = delete_transaction(user.id, 1234, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }
}
