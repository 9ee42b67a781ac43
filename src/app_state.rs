//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{Error, PasswordHash, db::initialize};

/// How long an access token is valid for by default.
pub const DEFAULT_ACCESS_TOKEN_DURATION: Duration = Duration::minutes(5);

/// How long a refresh token is valid for by default.
pub const DEFAULT_REFRESH_TOKEN_DURATION: Duration = Duration::days(1);

/// The keys for signing and verifying JSON Web Tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// The key for signing new tokens.
    pub encoding_key: EncodingKey,
    /// The key for verifying tokens sent by clients.
    pub decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the signing and verification keys from a shared `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys { .. }")
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// How long access tokens are valid for.
    pub access_token_duration: Duration,

    /// How long refresh tokens are valid for.
    pub refresh_token_duration: Duration,

    /// The bcrypt cost used when hashing the passwords of new users.
    pub password_hash_cost: u32,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Tokens are signed with `jwt_secret` and use the default lifetimes.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, jwt_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            access_token_duration: DEFAULT_ACCESS_TOKEN_DURATION,
            refresh_token_duration: DEFAULT_REFRESH_TOKEN_DURATION,
            password_hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Set how long access and refresh tokens are valid for.
    pub fn with_token_durations(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_duration = access;
        self.refresh_token_duration = refresh;
        self
    }

    /// Set the bcrypt cost for hashing new passwords.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}

/// The state needed by handlers that only read and write records.
#[derive(Debug, Clone)]
pub struct DbState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DbState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for issuing and checking tokens.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,
    /// How long access tokens are valid for.
    pub access_token_duration: Duration,
    /// How long refresh tokens are valid for.
    pub refresh_token_duration: Duration,
    /// The bcrypt cost used when hashing the passwords of new users.
    pub password_hash_cost: u32,
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            access_token_duration: state.access_token_duration,
            refresh_token_duration: state.refresh_token_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}
