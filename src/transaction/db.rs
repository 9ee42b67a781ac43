//! Database operations for transactions.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    customer::CustomerId,
    db::{get_decimal, get_optional_decimal},
    material::MaterialId,
    transaction::{NewTransaction, Transaction, TransactionId, TransactionView},
    validation::FieldErrors,
};

const TRANSACTION_COLUMNS: &str = "id, transaction_type, material_id, customer_id, quantity, \
    total_price, money_received, description, timestamp";

/// Create a transaction stamped with the current time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidForeignKey] if the material or customer does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (transaction_type, material_id, customer_id, quantity,
                total_price, money_received, description, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                transaction.transaction_type,
                transaction.material,
                transaction.customer,
                transaction.quantity.map(|quantity| quantity.to_string()),
                transaction.total_price.to_string(),
                transaction.money_received.map(|money| money.to_string()),
                transaction.description,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

const VIEW_QUERY: &str = "SELECT t.id, t.transaction_type, t.material_id, t.customer_id,
        t.quantity, t.total_price, t.money_received, t.description, t.timestamp,
        material.name, customer.name
    FROM \"transaction\" t
    LEFT JOIN material ON material.id = t.material_id
    LEFT JOIN customer ON customer.id = t.customer_id";

/// Retrieve a transaction along with the names of its material and customer.
pub fn get_transaction_view(
    id: TransactionId,
    connection: &Connection,
) -> Result<TransactionView, Error> {
    connection
        .prepare(&format!("{VIEW_QUERY} WHERE t.id = :id"))?
        .query_row(&[(":id", &id)], map_view_row)
        .map_err(|error| error.into())
}

/// Retrieve every transaction with material and customer names, newest first.
pub fn get_all_transaction_views(connection: &Connection) -> Result<Vec<TransactionView>, Error> {
    connection
        .prepare(&format!("{VIEW_QUERY} ORDER BY t.timestamp DESC, t.id DESC"))?
        .query_map([], map_view_row)?
        .map(|maybe_view| maybe_view.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the fields of a transaction, keeping its timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::InvalidForeignKey] if the material or customer does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET transaction_type = ?1, material_id = ?2, customer_id = ?3, quantity = ?4,
                total_price = ?5, money_received = ?6, description = ?7
             WHERE id = ?8
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                transaction.transaction_type,
                transaction.material,
                transaction.customer,
                transaction.quantity.map(|quantity| quantity.to_string()),
                transaction.total_price.to_string(),
                transaction.money_received.map(|money| money.to_string()),
                transaction.description,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Delete a transaction by ID. Returns an error if the transaction doesn't exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Check that the material and customer a transaction refers to exist.
///
/// Returns a field error for each reference that does not point to a record.
///
/// # Errors
/// Returns an [Error::SqlError] if the lookups fail.
pub fn find_missing_references(
    material: Option<MaterialId>,
    customer: Option<CustomerId>,
    connection: &Connection,
) -> Result<FieldErrors, Error> {
    let mut errors = FieldErrors::new();

    if let Some(material_id) = material
        && !record_exists("material", material_id, connection)?
    {
        errors.add("material", invalid_pk_message(material_id));
    }

    if let Some(customer_id) = customer
        && !record_exists("customer", customer_id, connection)?
    {
        errors.add("customer", invalid_pk_message(customer_id));
    }

    Ok(errors)
}

fn record_exists(table: &str, id: i64, connection: &Connection) -> Result<bool, Error> {
    let found = connection
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| {
            Ok(())
        })
        .optional()?;

    Ok(found.is_some())
}

fn invalid_pk_message(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('CR', 'DB', 'RC')),
            material_id INTEGER,
            customer_id INTEGER,
            quantity TEXT,
            total_price TEXT NOT NULL,
            money_received TEXT,
            description TEXT,
            timestamp TEXT NOT NULL,
            FOREIGN KEY(material_id) REFERENCES material(id) ON DELETE SET NULL,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_timestamp ON \"transaction\"(timestamp);
        CREATE INDEX IF NOT EXISTS idx_transaction_material ON \"transaction\"(material_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_customer ON \"transaction\"(customer_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        material: row.get(2)?,
        customer: row.get(3)?,
        quantity: get_optional_decimal(row, 4)?,
        total_price: get_decimal(row, 5)?,
        money_received: get_optional_decimal(row, 6)?,
        description: row.get(7)?,
        timestamp: row.get(8)?,
    })
}

fn map_view_row(row: &Row) -> Result<TransactionView, rusqlite::Error> {
    Ok(TransactionView {
        transaction: map_transaction_row(row)?,
        material_name: row.get(9)?,
        customer_name: row.get(10)?,
    })
}
