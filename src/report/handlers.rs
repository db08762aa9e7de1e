//! HTTP handler for the spending report.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Claims,
    report::{RangeSelector, Report, ReportSettings, build_report},
    timezone::LocalTime,
    transaction::get_transactions,
};

/// The state needed for the report.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The symbol written before amounts in insights.
    pub currency_symbol: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            currency_symbol: state.currency_symbol.clone(),
        }
    }
}

/// The query string for the report, e.g. `?range=30`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The time window, defaults to every transaction.
    #[serde(default)]
    pub range: RangeSelector,
}

/// Route handler for the report over the user's transactions in the requested range.
pub async fn get_report(
    State(state): State<ReportState>,
    claims: Claims,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, Error> {
    let local_time = LocalTime::from_timezone_name(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let snapshot = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(claims.user_id, &connection)?
    };

    let settings = ReportSettings {
        local_time,
        currency_symbol: state.currency_symbol,
    };
    let report = build_report(&snapshot, query.range, OffsetDateTime::now_utc(), &settings);
    tracing::debug!(
        "built {} report over {} of {} transactions for user {}",
        query.range.as_str(),
        report.transaction_count,
        snapshot.len(),
        claims.user_id
    );

    Ok(Json(report))
}
