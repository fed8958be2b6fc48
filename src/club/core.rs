use std::fmt::Display;

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// The lifecycle status of a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClubStatus {
    #[default]
    Active,
    Inactive,
    Dissolved,
}

impl ClubStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubStatus::Active => "active",
            ClubStatus::Inactive => "inactive",
            ClubStatus::Dissolved => "dissolved",
        }
    }

    pub fn from_str(status: &str) -> Option<Self> {
        match status {
            "active" => Some(ClubStatus::Active),
            "inactive" => Some(ClubStatus::Inactive),
            "dissolved" => Some(ClubStatus::Dissolved),
            _ => None,
        }
    }
}

impl Display for ClubStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An investment club.
#[derive(Debug, Clone, PartialEq)]
pub struct Club {
    /// The id for the club.
    pub id: DatabaseId,
    /// The club's name, unique across the application.
    pub name: String,
    /// A free-form description of the club.
    pub description: String,
    /// The club's contact email address.
    pub contact_email: String,
    /// The club's contact phone number.
    pub contact_phone: String,
    /// The club's lifecycle status.
    pub status: ClubStatus,
}

/// A validated club waiting to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClub {
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: String,
}

pub fn create_club_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS club (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            contact_email TEXT NOT NULL,
            contact_phone TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert a new club into the database, stamping the audit columns with
/// `created_by` and the current time.
///
/// # Errors
/// Returns [Error::DuplicateClubName] if a club with the same name exists, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn insert_club(
    new_club: &NewClub,
    created_by: UserId,
    connection: &Connection,
) -> Result<Club, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO club (
            name, description, contact_email, contact_phone, status,
            created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            &new_club.name,
            &new_club.description,
            &new_club.contact_email,
            &new_club.contact_phone,
            ClubStatus::Active.as_str(),
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(Club {
        id: connection.last_insert_rowid(),
        name: new_club.name.clone(),
        description: new_club.description.clone(),
        contact_email: new_club.contact_email.clone(),
        contact_phone: new_club.contact_phone.clone(),
        status: ClubStatus::Active,
    })
}

pub fn map_row_to_club(row: &rusqlite::Row) -> Result<Club, rusqlite::Error> {
    let status: String = row.get(5)?;

    Ok(Club {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        contact_email: row.get(3)?,
        contact_phone: row.get(4)?,
        status: ClubStatus::from_str(&status).unwrap_or_default(),
    })
}

const CLUB_COLUMNS: &str = "id, name, description, contact_email, contact_phone, status";

/// Get the club with `club_id` from the database.
///
/// # Errors
/// Returns [Error::NotFound] if `club_id` does not refer to a club.
pub fn get_club_by_id(club_id: DatabaseId, connection: &Connection) -> Result<Club, Error> {
    connection
        .prepare(&format!("SELECT {CLUB_COLUMNS} FROM club WHERE id = :id"))?
        .query_row(&[(":id", &club_id)], map_row_to_club)
        .map_err(|error| error.into())
}

/// Get up to `limit` clubs created by `user_id`, oldest first.
pub fn get_clubs_created_by(
    user_id: UserId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Club>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CLUB_COLUMNS} FROM club WHERE created_by = :created_by
            ORDER BY created_at ASC, id ASC LIMIT :limit"
        ))?
        .query_map(
            rusqlite::named_params! {":created_by": user_id.as_i64(), ":limit": limit},
            map_row_to_club,
        )?
        .map(|club_result| club_result.map_err(Error::from))
        .collect()
}
