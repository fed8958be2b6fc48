use std::fmt::Display;

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// How often a contribution falls due within a financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuePeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl DuePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuePeriod::Monthly => "monthly",
            DuePeriod::Quarterly => "quarterly",
            DuePeriod::Yearly => "yearly",
        }
    }

    pub fn from_str(period: &str) -> Option<Self> {
        match period {
            "monthly" => Some(DuePeriod::Monthly),
            "quarterly" => Some(DuePeriod::Quarterly),
            "yearly" => Some(DuePeriod::Yearly),
            _ => None,
        }
    }

    /// All periods, in form-display order.
    pub const ALL: [DuePeriod; 3] = [DuePeriod::Monthly, DuePeriod::Quarterly, DuePeriod::Yearly];
}

impl Display for DuePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring contribution owed by each participant of a financial year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// The id for the contribution.
    pub id: DatabaseId,
    /// The financial year the contribution belongs to.
    pub financial_year_id: DatabaseId,
    /// The amount due each period, in dollars.
    pub amount: f64,
    pub due_period: DuePeriod,
}

pub fn create_contribution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_year_contribution (
            id INTEGER PRIMARY KEY,
            financial_year_id INTEGER NOT NULL
                REFERENCES financial_year(id) ON DELETE CASCADE,
            amount REAL NOT NULL,
            due_period TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_contribution(row: &rusqlite::Row) -> Result<Contribution, rusqlite::Error> {
    let due_period: String = row.get(3)?;

    Ok(Contribution {
        id: row.get(0)?,
        financial_year_id: row.get(1)?,
        amount: row.get(2)?,
        due_period: DuePeriod::from_str(&due_period).unwrap_or(DuePeriod::Monthly),
    })
}

/// Insert a new contribution for `financial_year_id`.
///
/// The caller is responsible for checking `amount >= 0`. There is no
/// uniqueness constraint, a financial year may carry several contributions
/// with the same period.
pub fn insert_contribution(
    financial_year_id: DatabaseId,
    amount: f64,
    due_period: DuePeriod,
    created_by: UserId,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO financial_year_contribution (
            financial_year_id, amount, due_period, created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            financial_year_id,
            amount,
            due_period.as_str(),
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(Contribution {
        id: connection.last_insert_rowid(),
        financial_year_id,
        amount,
        due_period,
    })
}

/// Get the contributions of `financial_year_id`, ordered by due period.
pub fn get_contributions(
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(
            "SELECT id, financial_year_id, amount, due_period FROM financial_year_contribution
            WHERE financial_year_id = :financial_year_id
            ORDER BY due_period ASC, id ASC",
        )?
        .query_map(
            rusqlite::named_params! {":financial_year_id": financial_year_id},
            map_row_to_contribution,
        )?
        .map(|contribution_result| contribution_result.map_err(Error::from))
        .collect()
}

/// Get the monthly-period contributions of `financial_year_id`.
///
/// These are the dues that scale with the number of months elapsed in the
/// monthly report.
pub fn get_monthly_contributions(
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(
            "SELECT id, financial_year_id, amount, due_period FROM financial_year_contribution
            WHERE financial_year_id = :financial_year_id AND due_period = 'monthly'
            ORDER BY id ASC",
        )?
        .query_map(
            rusqlite::named_params! {":financial_year_id": financial_year_id},
            map_row_to_contribution,
        )?
        .map(|contribution_result| contribution_result.map_err(Error::from))
        .collect()
}
