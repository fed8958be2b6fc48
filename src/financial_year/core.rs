use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// A club's bookkeeping period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialYear {
    /// The id for the financial year.
    pub id: DatabaseId,
    /// The club the financial year belongs to.
    pub club_id: DatabaseId,
    pub start_date: Date,
    pub end_date: Date,
}

pub fn create_financial_year_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_year (
            id INTEGER PRIMARY KEY,
            club_id INTEGER NOT NULL REFERENCES club(id) ON DELETE CASCADE,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            UNIQUE (club_id, start_date, end_date)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_financial_year(row: &rusqlite::Row) -> Result<FinancialYear, rusqlite::Error> {
    Ok(FinancialYear {
        id: row.get(0)?,
        club_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
    })
}

/// Insert a new financial year for `club_id`.
///
/// The caller is responsible for checking `start_date < end_date`.
///
/// # Errors
/// Returns [Error::DuplicateFinancialYear] if the club already has a financial
/// year with the same dates.
pub fn insert_financial_year(
    club_id: DatabaseId,
    start_date: Date,
    end_date: Date,
    created_by: UserId,
    connection: &Connection,
) -> Result<FinancialYear, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO financial_year (
            club_id, start_date, end_date, created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            club_id,
            start_date,
            end_date,
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(FinancialYear {
        id: connection.last_insert_rowid(),
        club_id,
        start_date,
        end_date,
    })
}

/// Get the financial year with `financial_year_id`, checking it belongs to `club_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the id does not resolve or the year belongs to
/// a different club.
pub fn get_financial_year(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<FinancialYear, Error> {
    connection
        .prepare(
            "SELECT id, club_id, start_date, end_date FROM financial_year
            WHERE id = :id AND club_id = :club_id",
        )?
        .query_row(
            rusqlite::named_params! {":id": financial_year_id, ":club_id": club_id},
            map_row_to_financial_year,
        )
        .map_err(|error| error.into())
}

/// Get all financial years of `club_id`, newest start date first.
pub fn get_financial_years_for_club(
    club_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<FinancialYear>, Error> {
    connection
        .prepare(
            "SELECT id, club_id, start_date, end_date FROM financial_year
            WHERE club_id = :club_id ORDER BY start_date DESC",
        )?
        .query_map(
            rusqlite::named_params! {":club_id": club_id},
            map_row_to_financial_year,
        )?
        .map(|year_result| year_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod financial_year_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{PasswordHash, UserId, create_user},
        club::{NewClub, insert_club},
        database_id::DatabaseId,
        db::initialize,
    };

    use super::{get_financial_year, get_financial_years_for_club, insert_financial_year};

    fn get_test_connection() -> (Connection, UserId, DatabaseId) {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            "jane.doe@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");
        let club = insert_club(
            &NewClub {
                name: "Umoja Investments".to_owned(),
                description: String::new(),
                contact_email: String::new(),
                contact_phone: String::new(),
            },
            user.id,
            &connection,
        )
        .expect("Could not create test club");

        (connection, user.id, club.id)
    }

    #[test]
    fn insert_financial_year_succeeds() {
        let (connection, user_id, club_id) = get_test_connection();

        let year = insert_financial_year(
            club_id,
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_financial_year(club_id, year.id, &connection),
            Ok(year)
        );
    }

    #[test]
    fn insert_financial_year_fails_with_duplicate_dates() {
        let (connection, user_id, club_id) = get_test_connection();
        let start = date!(2025 - 01 - 01);
        let end = date!(2025 - 12 - 31);

        insert_financial_year(club_id, start, end, user_id, &connection).unwrap();
        let duplicate = insert_financial_year(club_id, start, end, user_id, &connection);

        assert_eq!(duplicate, Err(Error::DuplicateFinancialYear));
    }

    #[test]
    fn get_financial_year_checks_club() {
        let (connection, user_id, club_id) = get_test_connection();
        let other_club = insert_club(
            &NewClub {
                name: "Other Club".to_owned(),
                description: String::new(),
                contact_email: String::new(),
                contact_phone: String::new(),
            },
            user_id,
            &connection,
        )
        .unwrap();
        let year = insert_financial_year(
            club_id,
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_financial_year(other_club.id, year.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_financial_years_for_club_orders_newest_first() {
        let (connection, user_id, club_id) = get_test_connection();
        let older = insert_financial_year(
            club_id,
            date!(2024 - 01 - 01),
            date!(2024 - 12 - 31),
            user_id,
            &connection,
        )
        .unwrap();
        let newer = insert_financial_year(
            club_id,
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            user_id,
            &connection,
        )
        .unwrap();

        let years = get_financial_years_for_club(club_id, &connection).unwrap();

        assert_eq!(years, vec![newer, older]);
    }
}
