//! Defines the route handler for log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, User,
    auth::{JwtKeys, encode_jwt},
    user::get_user_by_email,
};

/// The state needed for logging in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys used to sign tokens.
    pub jwt_keys: JwtKeys,
    /// How long issued tokens stay valid.
    pub token_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
        }
    }
}

/// The credentials entered during log-in.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    /// Email entered during log-in.
    #[serde(default)]
    pub email: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}

/// The body returned after a successful log-in.
#[derive(Debug, Serialize)]
pub struct LogInResponse {
    message: &'static str,
    token: String,
    user: User,
    /// Seconds until `token` expires.
    expires_in: i64,
}

/// Handler for log-in requests.
///
/// Unknown emails and wrong passwords give the same error so that clients
/// cannot discover which emails are registered.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is empty.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn log_in(
    State(state): State<LogInState>,
    Json(form): Json<LogInForm>,
) -> Result<Json<LogInResponse>, Error> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(Error::MissingFields(
            "Email and password are required.".to_owned(),
        ));
    }

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_email(&form.email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let is_password_correct = user
        .password_hash
        .verify(&form.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_correct {
        tracing::debug!("wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = encode_jwt(
        user.id,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.jwt_keys,
    )?;
    tracing::info!("user {} logged in", user.id);

    Ok(Json(LogInResponse {
        message: "Login successful",
        token,
        user,
        expires_in: state.token_duration.whole_seconds(),
    }))
}
