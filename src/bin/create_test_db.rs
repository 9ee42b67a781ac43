use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use tradebook::{
    NewCustomer, NewExpense, NewMaterial, NewStartingCapital, NewTransaction, PasswordHash,
    TransactionType, ValidatedPassword, create_customer, create_expense, create_material,
    create_starting_capital, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of tradebook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    create_user("test", password_hash, &conn)?;

    println!("Creating sample records...");
    create_sample_records(&conn)?;

    println!("Success!");

    Ok(())
}

fn create_sample_records(conn: &Connection) -> Result<(), tradebook::Error> {
    let today = OffsetDateTime::now_utc().date();

    create_starting_capital(
        NewStartingCapital {
            description: "Owner's savings".to_owned(),
            amount: Decimal::new(500_000, 2),
            date: today - Duration::days(30),
        },
        conn,
    )?;

    let copper = create_material(
        NewMaterial {
            name: "Copper wire".to_owned(),
            color: Some("Orange".to_owned()),
        },
        conn,
    )?;
    let aluminium = create_material(
        NewMaterial {
            name: "Aluminium cans".to_owned(),
            color: Some("Silver".to_owned()),
        },
        conn,
    )?;

    let customer = create_customer(
        NewCustomer {
            name: "Harbour Metals".to_owned(),
        },
        conn,
    )?;

    create_expense(
        NewExpense {
            description: "Truck diesel".to_owned(),
            amount: Decimal::new(8_450, 2),
            date: today - Duration::days(2),
            expense_type: "Fuel".to_owned(),
        },
        conn,
    )?;

    let transactions = [
        NewTransaction {
            transaction_type: TransactionType::Credit,
            material: Some(copper.id),
            customer: None,
            quantity: Some(Decimal::new(12_000, 2)),
            total_price: Decimal::new(96_000, 2),
            money_received: Some(Decimal::ZERO),
            description: Some("Bought from a demolition site".to_owned()),
        },
        NewTransaction {
            transaction_type: TransactionType::Credit,
            material: Some(aluminium.id),
            customer: None,
            quantity: Some(Decimal::new(4_000, 2)),
            total_price: Decimal::new(6_000, 2),
            money_received: Some(Decimal::ZERO),
            description: None,
        },
        NewTransaction {
            transaction_type: TransactionType::Debit,
            material: Some(copper.id),
            customer: Some(customer.id),
            quantity: Some(Decimal::new(10_000, 2)),
            total_price: Decimal::new(110_000, 2),
            money_received: Some(Decimal::new(50_000, 2)),
            description: None,
        },
        NewTransaction {
            transaction_type: TransactionType::Reconciliation,
            material: None,
            customer: Some(customer.id),
            quantity: None,
            total_price: Decimal::new(60_000, 2),
            money_received: Some(Decimal::ZERO),
            description: Some("Balance paid by bank transfer".to_owned()),
        },
    ];

    for transaction in transactions {
        create_transaction(transaction, conn)?;
    }

    Ok(())
}
