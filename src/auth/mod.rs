//! Bearer token authentication, registration and log-in.
//!
//! Route handlers that take a [Claims] argument only run for requests carrying a
//! valid `Authorization: Bearer <token>` header.

mod log_in;
mod register;
mod token;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::Error;

pub use log_in::log_in;
pub use register::register_user;
pub use token::{Claims, JwtKeys, decode_jwt, encode_jwt};

impl<S> FromRequestParts<S> for Claims
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingToken
                } else {
                    Error::InvalidToken
                }
            })?;

        let keys = JwtKeys::from_ref(state);

        decode_jwt(bearer.token(), &keys)
    }
}
