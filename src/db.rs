//! Database initialization for the application.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, club::create_club_table, contribution::create_contribution_table,
    financial_year::create_financial_year_table, individual_due::create_individual_due_table,
    member::create_club_member_table, participant::create_participant_table,
    transaction::create_transaction_table,
};

/// Create the tables for the application's domain models.
///
/// Tables are created inside a single exclusive transaction so that a
/// partially initialized database is never left behind.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite leaves foreign key enforcement off unless asked.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_club_table(&transaction)?;
    create_club_member_table(&transaction)?;
    create_financial_year_table(&transaction)?;
    create_contribution_table(&transaction)?;
    create_participant_table(&transaction)?;
    create_individual_due_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
