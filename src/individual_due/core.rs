use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// A one-off charge against a single club member.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualDue {
    /// The id for the due.
    pub id: DatabaseId,
    /// The financial year the due belongs to.
    pub financial_year_id: DatabaseId,
    /// The member the due is charged against.
    pub club_member_id: DatabaseId,
    pub description: String,
    /// The amount due, in dollars.
    pub amount: f64,
    pub due_date: Date,
}

/// An individual due joined with the member's email for display.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualDueListRow {
    pub due: IndividualDue,
    pub email: Option<String>,
}

pub fn create_individual_due_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS individual_due (
            id INTEGER PRIMARY KEY,
            financial_year_id INTEGER NOT NULL
                REFERENCES financial_year(id) ON DELETE CASCADE,
            club_member_id INTEGER NOT NULL
                REFERENCES club_member(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            due_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

/// A validated individual due waiting to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIndividualDue {
    pub financial_year_id: DatabaseId,
    pub club_member_id: DatabaseId,
    pub description: String,
    pub amount: f64,
    pub due_date: Date,
}

/// Insert a new individual due.
///
/// The caller is responsible for checking `amount >= 0`.
///
/// # Errors
/// Returns [Error::InvalidForeignKey] if the financial year or member id does
/// not resolve.
pub fn insert_individual_due(
    new_due: &NewIndividualDue,
    created_by: UserId,
    connection: &Connection,
) -> Result<IndividualDue, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO individual_due (
            financial_year_id, club_member_id, description, amount, due_date,
            created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            new_due.financial_year_id,
            new_due.club_member_id,
            &new_due.description,
            new_due.amount,
            new_due.due_date,
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(IndividualDue {
        id: connection.last_insert_rowid(),
        financial_year_id: new_due.financial_year_id,
        club_member_id: new_due.club_member_id,
        description: new_due.description.clone(),
        amount: new_due.amount,
        due_date: new_due.due_date,
    })
}

/// Get the individual dues of `financial_year_id` with member emails, by due date.
pub fn get_individual_dues(
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<IndividualDueListRow>, Error> {
    connection
        .prepare(
            "SELECT individual_due.id, individual_due.financial_year_id,
                individual_due.club_member_id, individual_due.description,
                individual_due.amount, individual_due.due_date, user.email
            FROM individual_due
            JOIN club_member ON club_member.id = individual_due.club_member_id
            LEFT JOIN user ON user.id = club_member.user_id
            WHERE individual_due.financial_year_id = :financial_year_id
            ORDER BY individual_due.due_date ASC, individual_due.id ASC",
        )?
        .query_map(
            rusqlite::named_params! {":financial_year_id": financial_year_id},
            |row| {
                Ok(IndividualDueListRow {
                    due: IndividualDue {
                        id: row.get(0)?,
                        financial_year_id: row.get(1)?,
                        club_member_id: row.get(2)?,
                        description: row.get(3)?,
                        amount: row.get(4)?,
                        due_date: row.get(5)?,
                    },
                    email: row.get(6)?,
                })
            },
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}
