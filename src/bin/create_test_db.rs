use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use hisab::{
    NewUser, PasswordHash, ValidatedPassword, create_user, initialize_db,
    transaction::{NewTransaction, TransactionKind, create_transaction},
};

/// A utility for creating a test database for the REST API server of hisab.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Sample transactions as (kind, amount, category, days ago, note).
const SAMPLE_TRANSACTIONS: [(TransactionKind, f64, &str, i64, &str); 10] = [
    (TransactionKind::Income, 52000.0, "Salary", 40, "March salary"),
    (TransactionKind::Expense, 15000.0, "Rent", 38, ""),
    (TransactionKind::Expense, 2350.5, "Groceries", 25, "Weekly shop"),
    (TransactionKind::Income, 52000.0, "Salary", 10, "April salary"),
    (TransactionKind::Expense, 15000.0, "Rent", 8, ""),
    (TransactionKind::Expense, 420.0, "Food", 5, "Dinner out"),
    (TransactionKind::Expense, 180.0, "Transport", 5, "Auto rickshaw"),
    (TransactionKind::Expense, 1299.0, "Shopping", 3, "Shoes"),
    (TransactionKind::Expense, 650.0, "Bills", 2, "Electricity"),
    (TransactionKind::Expense, 95.0, "Food", 0, "Chai and snacks"),
];

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

    println!("Creating test user demo@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            name: "Demo".to_owned(),
            email: "demo@example.com".to_owned(),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating sample transactions...");

    let now = OffsetDateTime::now_utc();

    for (kind, amount, category, days_ago, note) in SAMPLE_TRANSACTIONS {
        create_transaction(
            user.id,
            NewTransaction::new(kind, amount, now - Duration::days(days_ago))
                .category(category)
                .note(note),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
