//! Defines the route handler for registering new users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, NewUser, PasswordHash, User, ValidatedPassword, create_user};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The data entered during registration.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The user's display name.
    #[serde(default)]
    pub name: String,
    /// The email to log in with.
    #[serde(default)]
    pub email: String,
    /// The password to log in with.
    #[serde(default)]
    pub password: String,
}

/// The body returned after a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    message: &'static str,
    user: User,
}

/// Handler for registration requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The name, email or password is empty.
/// - The email does not look like an email address.
/// - The password is too easy to guess.
/// - The email is already registered.
/// - An internal error occurred when hashing the password or storing the user.
pub async fn register_user(
    State(state): State<RegisterState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(Error::MissingFields(
            "Name, email and password are required.".to_owned(),
        ));
    }

    if !email.contains('@') {
        return Err(Error::MissingFields(
            "A valid email address is required.".to_owned(),
        ));
    }

    let password = ValidatedPassword::new(&form.password)?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(
        NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash,
        },
        &connection,
    )?;
    tracing::info!("registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered",
            user,
        }),
    ))
}
