//! Defines the JSON endpoints for listing, creating, updating and deleting transactions.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::Claims,
    timezone::LocalTime,
    transaction::{
        Transaction, TransactionForm, TransactionId, create_transaction, delete_transaction,
        get_transaction, get_transactions, update_transaction,
    },
};

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl TransactionState {
    fn local_time(&self) -> Result<LocalTime, Error> {
        LocalTime::from_timezone_name(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// A route handler that lists the user's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.connection()?;
    let transactions = get_transactions(claims.user_id, &connection)?;

    Ok(Json(transactions))
}

/// A route handler for a single one of the user's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.connection()?;
    let transaction = get_transaction(claims.user_id, transaction_id, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = form
        .validate(state.local_time()?)
        .inspect_err(|error| tracing::debug!("rejected transaction: {error}"))?;

    let connection = state.connection()?;
    let transaction = create_transaction(claims.user_id, new_transaction, &connection)?;
    tracing::debug!(
        "user {} created transaction {}",
        claims.user_id,
        transaction.id
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for replacing the fields of one of the user's transactions.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let update = form
        .validate(state.local_time()?)
        .inspect_err(|error| tracing::debug!("rejected transaction: {error}"))?;

    let connection = state.connection()?;
    let transaction = update_transaction(claims.user_id, transaction_id, update, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for deleting one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state.connection()?;
    delete_transaction(claims.user_id, transaction_id, &connection)?;
    tracing::debug!(
        "user {} deleted transaction {transaction_id}",
        claims.user_id
    );

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
