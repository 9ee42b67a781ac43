//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// The maximum number of characters in a username.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` and `username` are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The parts of a [User] that are safe to send to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateUsername] if `username` is taken, or a
/// [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        password_hash,
    })
}

/// Get the user from the database with the given `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Replace the password hash for the user `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let username = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(raw_id),
        username,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
