//! Database operations for customers.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    customer::{Customer, CustomerId, NewCustomer},
};

/// Create a customer and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCustomerName] if a customer with the same name exists.
pub fn create_customer(customer: NewCustomer, connection: &Connection) -> Result<Customer, Error> {
    connection.execute(
        "INSERT INTO customer (name) VALUES (?1);",
        (&customer.name,),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Customer {
        id,
        name: customer.name,
    })
}

/// Retrieve a single customer by ID.
pub fn get_customer(customer_id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    connection
        .prepare("SELECT id, name FROM customer WHERE id = :id;")?
        .query_row(&[(":id", &customer_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all customers ordered alphabetically by name.
pub fn get_all_customers(connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare("SELECT id, name FROM customer ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_customer| maybe_customer.map_err(|error| error.into()))
        .collect()
}

/// Overwrite a customer's fields. Returns an error if the customer doesn't exist.
pub fn update_customer(
    customer_id: CustomerId,
    customer: NewCustomer,
    connection: &Connection,
) -> Result<Customer, Error> {
    let rows_affected = connection.execute(
        "UPDATE customer SET name = ?1 WHERE id = ?2",
        (&customer.name, customer_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Customer {
        id: customer_id,
        name: customer.name,
    })
}

/// Delete a customer by ID. Returns an error if the customer doesn't exist.
///
/// Transactions that referenced the customer are kept with the reference cleared.
pub fn delete_customer(customer_id: CustomerId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM customer WHERE id = ?1", [customer_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the customer table.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod customer_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        customer::{
            NewCustomer, create_customer, delete_customer, get_all_customers, get_customer,
            update_customer,
        },
    };

    use super::create_customer_table;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_customer_table(&connection).expect("Could not create customer table");
        connection
    }

    fn new_customer(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_owned(),
        }
    }

    #[test]
    fn create_customer_succeeds() {
        let connection = get_test_db_connection();

        let got = create_customer(new_customer("Acme Metals"), &connection)
            .expect("Could not create customer");

        assert!(got.id > 0);
        assert_eq!(got.name, "Acme Metals");
    }

    #[test]
    fn create_customer_with_duplicate_name_fails() {
        let connection = get_test_db_connection();
        create_customer(new_customer("Acme Metals"), &connection).unwrap();

        let result = create_customer(new_customer("Acme Metals"), &connection);

        assert_eq!(result, Err(Error::DuplicateCustomerName));
    }

    #[test]
    fn get_customer_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(get_customer(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_all_customers_orders_by_name() {
        let connection = get_test_db_connection();
        for name in ["Wexley", "Baker & Sons", "Malik Trading"] {
            create_customer(new_customer(name), &connection).unwrap();
        }

        let names: Vec<String> = get_all_customers(&connection)
            .unwrap()
            .into_iter()
            .map(|customer| customer.name)
            .collect();

        assert_eq!(names, ["Baker & Sons", "Malik Trading", "Wexley"]);
    }

    #[test]
    fn update_customer_succeeds() {
        let connection = get_test_db_connection();
        let customer = create_customer(new_customer("Original"), &connection).unwrap();

        update_customer(customer.id, new_customer("Renamed"), &connection).unwrap();

        let got = get_customer(customer.id, &connection).unwrap();
        assert_eq!(got.name, "Renamed");
    }

    #[test]
    fn update_customer_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_customer(999999, new_customer("Renamed"), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_customer_succeeds() {
        let connection = get_test_db_connection();
        let customer = create_customer(new_customer("ToDelete"), &connection).unwrap();

        assert_eq!(delete_customer(customer.id, &connection), Ok(()));
        assert_eq!(get_customer(customer.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_customer_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(delete_customer(999999, &connection), Err(Error::NotFound));
    }
}
