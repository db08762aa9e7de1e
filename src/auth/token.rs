//! Creates and checks the JSON web tokens that authenticate API requests.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// The contents of a JSON web token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token was issued to.
    pub user_id: UserID,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

/// The keys used to sign and verify tokens, derived from a single shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create the signing and verification keys from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Create a token for `user_id` that is valid for `duration` from `issued_at`.
///
/// # Errors
/// Returns an [Error::TokenCreation] if the token could not be signed.
pub fn encode_jwt(
    user_id: UserID,
    issued_at: OffsetDateTime,
    duration: Duration,
    keys: &JwtKeys,
) -> Result<String, Error> {
    let claims = Claims {
        user_id,
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns an [Error::InvalidToken] if the token is malformed, was signed with a
/// different secret or has expired.
pub fn decode_jwt(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .inspect_err(|error| tracing::debug!("rejected token: {error}"))
        .map_err(|_| Error::InvalidToken)
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{Error, UserID};

    use super::{JwtKeys, decode_jwt, encode_jwt};

    #[test]
    fn decode_gives_back_user_id() {
        let keys = JwtKeys::new("foobar");
        let now = OffsetDateTime::now_utc();

        let token = encode_jwt(UserID::new(42), now, Duration::hours(1), &keys).unwrap();
        let claims = decode_jwt(&token, &keys).unwrap();

        assert_eq!(claims.user_id, UserID::new(42));
        assert_eq!(claims.iat, now.unix_timestamp());
        assert_eq!(claims.exp, (now + Duration::hours(1)).unix_timestamp());
    }

    #[test]
    fn decode_rejects_token_signed_with_other_secret() {
        let token = encode_jwt(
            UserID::new(1),
            OffsetDateTime::now_utc(),
            Duration::hours(1),
            &JwtKeys::new("foobar"),
        )
        .unwrap();

        let result = decode_jwt(&token, &JwtKeys::new("notfoobar"));

        assert_eq!(result, Err(Error::InvalidToken));
    }

    #[test]
    fn decode_rejects_expired_token() {
        let keys = JwtKeys::new("foobar");
        let issued_at = OffsetDateTime::now_utc() - Duration::hours(2);

        let token = encode_jwt(UserID::new(1), issued_at, Duration::hours(1), &keys).unwrap();

        assert_eq!(decode_jwt(&token, &keys), Err(Error::InvalidToken));
    }

    #[test]
    fn decode_rejects_garbage() {
        let keys = JwtKeys::new("foobar");

        assert_eq!(decode_jwt("not.a.token", &keys), Err(Error::InvalidToken));
    }
}
