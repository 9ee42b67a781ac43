//! Database operations for starting capital.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::get_decimal,
    starting_capital::{NewStartingCapital, StartingCapital, StartingCapitalId},
};

/// Create a starting capital record and return it with its generated ID.
pub fn create_starting_capital(
    capital: NewStartingCapital,
    connection: &Connection,
) -> Result<StartingCapital, Error> {
    connection.execute(
        "INSERT INTO starting_capital (description, amount, date) VALUES (?1, ?2, ?3);",
        (&capital.description, capital.amount.to_string(), capital.date),
    )?;

    let id = connection.last_insert_rowid();

    Ok(StartingCapital {
        id,
        description: capital.description,
        amount: capital.amount,
        date: capital.date,
    })
}

/// Retrieve a single starting capital record by ID.
pub fn get_starting_capital(
    capital_id: StartingCapitalId,
    connection: &Connection,
) -> Result<StartingCapital, Error> {
    connection
        .prepare("SELECT id, description, amount, date FROM starting_capital WHERE id = :id;")?
        .query_row(&[(":id", &capital_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all starting capital records in the order they were created.
pub fn get_all_starting_capital(connection: &Connection) -> Result<Vec<StartingCapital>, Error> {
    connection
        .prepare("SELECT id, description, amount, date FROM starting_capital ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_capital| maybe_capital.map_err(|error| error.into()))
        .collect()
}

/// Overwrite a starting capital record. Returns an error if the record doesn't exist.
pub fn update_starting_capital(
    capital_id: StartingCapitalId,
    capital: NewStartingCapital,
    connection: &Connection,
) -> Result<StartingCapital, Error> {
    let rows_affected = connection.execute(
        "UPDATE starting_capital SET description = ?1, amount = ?2, date = ?3 WHERE id = ?4",
        (
            &capital.description,
            capital.amount.to_string(),
            capital.date,
            capital_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(StartingCapital {
        id: capital_id,
        description: capital.description,
        amount: capital.amount,
        date: capital.date,
    })
}

/// Delete a starting capital record by ID. Returns an error if the record doesn't exist.
pub fn delete_starting_capital(
    capital_id: StartingCapitalId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM starting_capital WHERE id = ?1", [capital_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the starting capital table.
pub fn create_starting_capital_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS starting_capital (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<StartingCapital, rusqlite::Error> {
    Ok(StartingCapital {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: get_decimal(row, 2)?,
        date: row.get(3)?,
    })
}
