//! Signing and verifying the JSON Web Tokens handed out at log-in.

use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, User, UserID, app_state::JwtKeys};

/// Which purpose a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// A short-lived token sent with every API request.
    Access,
    /// A longer-lived token that can only be exchanged for a new access token.
    Refresh,
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The username of the user the token was issued to.
    pub username: String,
    /// What the token may be used for.
    pub token_type: TokenType,
    /// The time the token was issued as a Unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: i64,
}

/// Create a signed token of `token_type` for `user` that expires after `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn issue_token(
    user: &User,
    token_type: TokenType,
    keys: &JwtKeys,
    duration: Duration,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        token_type,
        iat: now.unix_timestamp(),
        exp: (now + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and check it was issued as
/// `expected_type`.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, signed with a
/// different key, expired, or of the wrong type.
pub fn decode_token(token: &str, expected_type: TokenType, keys: &JwtKeys) -> Result<Claims, Error> {
    let claims = decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map_err(|error| {
            tracing::debug!("rejected token: {error}");
            Error::InvalidToken
        })?
        .claims;

    if claims.token_type != expected_type {
        tracing::debug!(
            "rejected {:?} token used as {:?} token",
            claims.token_type,
            expected_type
        );
        return Err(Error::InvalidToken);
    }

    Ok(claims)
}

#[cfg(test)]
mod token_tests {
    use time::Duration;

    use crate::{
        Error, PasswordHash, User, UserID,
        app_state::JwtKeys,
        auth::{TokenType, decode_token, issue_token},
    };

    fn test_user() -> User {
        User {
            id: UserID::new(3),
            username: "averyuser".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn decoded_token_has_user_details() {
        let keys = JwtKeys::from_secret("foobar");
        let token = issue_token(&test_user(), TokenType::Access, &keys, Duration::minutes(5))
            .expect("Could not issue token");

        let claims = decode_token(&token, TokenType::Access, &keys).unwrap();

        assert_eq!(claims.sub, UserID::new(3));
        assert_eq!(claims.username, "averyuser");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let keys = JwtKeys::from_secret("foobar");
        let token =
            issue_token(&test_user(), TokenType::Refresh, &keys, Duration::days(1)).unwrap();

        assert_eq!(
            decode_token(&token, TokenType::Access, &keys),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = JwtKeys::from_secret("foobar");
        let token =
            issue_token(&test_user(), TokenType::Access, &keys, Duration::minutes(-10)).unwrap();

        assert_eq!(
            decode_token(&token, TokenType::Access, &keys),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn token_signed_with_other_key_is_invalid() {
        let token = issue_token(
            &test_user(),
            TokenType::Access,
            &JwtKeys::from_secret("foobar"),
            Duration::minutes(5),
        )
        .unwrap();

        assert_eq!(
            decode_token(&token, TokenType::Access, &JwtKeys::from_secret("bazqux")),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = JwtKeys::from_secret("foobar");

        assert_eq!(
            decode_token("not.a.token", TokenType::Access, &keys),
            Err(Error::InvalidToken)
        );
    }
}
