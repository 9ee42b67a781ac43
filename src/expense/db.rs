//! Database operations for expenses.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::get_decimal,
    expense::{Expense, ExpenseId, NewExpense},
};

/// Create an expense and return it with its generated ID.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (description, amount, date, expense_type) VALUES (?1, ?2, ?3, ?4);",
        (
            &expense.description,
            expense.amount.to_string(),
            expense.date,
            &expense.expense_type,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        description: expense.description,
        amount: expense.amount,
        date: expense.date,
        expense_type: expense.expense_type,
    })
}

/// Retrieve a single expense by ID.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, expense_type FROM expense WHERE id = :id;",
        )?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all expenses, most recent first.
///
/// Expenses on the same date are ordered by newest record first.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, expense_type FROM expense
            ORDER BY date DESC, id DESC;",
        )?
        .query_map([], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Overwrite an expense. Returns an error if the expense doesn't exist.
pub fn update_expense(
    expense_id: ExpenseId,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET description = ?1, amount = ?2, date = ?3, expense_type = ?4
        WHERE id = ?5",
        (
            &expense.description,
            expense.amount.to_string(),
            expense.date,
            &expense.expense_type,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Expense {
        id: expense_id,
        description: expense.description,
        amount: expense.amount,
        date: expense.date,
        expense_type: expense.expense_type,
    })
}

/// Delete an expense by ID. Returns an error if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the expense table.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            expense_type TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: get_decimal(row, 2)?,
        date: row.get(3)?,
        expense_type: row.get(4)?,
    })
}
