//! Database initialization and column helpers shared by the record stores.

use std::{str::FromStr, sync::Mutex, sync::MutexGuard};

use rusqlite::{Connection, Row, TransactionBehavior, types::Type};
use rust_decimal::Decimal;

use crate::{
    Error, customer::create_customer_table, expense::create_expense_table,
    material::create_material_table, starting_capital::create_starting_capital_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection`, which deleting
/// materials and customers relies on to clear references held by
/// transactions.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_starting_capital_table(&transaction)?;
    create_material_table(&transaction)?;
    create_customer_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Read a decimal stored as text from column `index`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;
    parse_decimal(index, &text)
}

/// Read a nullable decimal stored as text from column `index`.
pub fn get_optional_decimal(row: &Row, index: usize) -> Result<Option<Decimal>, rusqlite::Error> {
    let text: Option<String> = row.get(index)?;
    text.map(|text| parse_decimal(index, &text)).transpose()
}

fn parse_decimal(index: usize, text: &str) -> Result<Decimal, rusqlite::Error> {
    Decimal::from_str(text)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let table_count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                ('user', 'starting_capital', 'material', 'customer', 'expense', 'transaction')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 6);
    }

    #[test]
    fn can_initialize_twice() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: i64 = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(enabled, 1);
    }
}

#[cfg(test)]
mod decimal_column_tests {
    use rusqlite::Connection;

    use super::{get_decimal, get_optional_decimal};

    #[test]
    fn reads_decimal_text() {
        let connection = Connection::open_in_memory().unwrap();

        let (value, missing) = connection
            .query_row("SELECT '12.50', NULL", [], |row| {
                Ok((get_decimal(row, 0)?, get_optional_decimal(row, 1)?))
            })
            .unwrap();

        assert_eq!(value.to_string(), "12.50");
        assert_eq!(missing, None);
    }

    #[test]
    fn rejects_non_decimal_text() {
        let connection = Connection::open_in_memory().unwrap();

        let result = connection.query_row("SELECT 'lots'", [], |row| get_decimal(row, 0));

        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(0, _, _))
        ));
    }
}
