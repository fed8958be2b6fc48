use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// An immutable ledger entry for a financial year.
///
/// Either `credit` or `debit` is expected to be set, never both, though this
/// is not enforced by the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialTransaction {
    /// The id for the transaction.
    pub id: DatabaseId,
    /// The financial year the transaction belongs to.
    pub financial_year_id: DatabaseId,
    /// The member the transaction relates to, if any.
    pub club_member_id: Option<DatabaseId>,
    /// Money flowing into the club, in dollars.
    pub credit: Option<f64>,
    /// Money flowing out of the club, in dollars.
    pub debit: Option<f64>,
    pub transaction_date: Date,
    pub description: String,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_transaction (
            id INTEGER PRIMARY KEY,
            financial_year_id INTEGER NOT NULL
                REFERENCES financial_year(id) ON DELETE CASCADE,
            club_member_id INTEGER REFERENCES club_member(id) ON DELETE SET NULL,
            credit REAL,
            debit REAL,
            transaction_date TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_row_to_transaction(
    row: &rusqlite::Row,
) -> Result<FinancialTransaction, rusqlite::Error> {
    Ok(FinancialTransaction {
        id: row.get(0)?,
        financial_year_id: row.get(1)?,
        club_member_id: row.get(2)?,
        credit: row.get(3)?,
        debit: row.get(4)?,
        transaction_date: row.get(5)?,
        description: row.get(6)?,
    })
}

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, financial_year_id, club_member_id, credit, debit, transaction_date, description";

/// A validated transaction waiting to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub financial_year_id: DatabaseId,
    pub club_member_id: Option<DatabaseId>,
    pub credit: Option<f64>,
    pub debit: Option<f64>,
    pub transaction_date: Date,
    pub description: String,
}

/// Insert a new ledger entry.
///
/// # Errors
/// Returns [Error::InvalidForeignKey] if the financial year or member id does
/// not resolve.
pub fn insert_transaction(
    new_transaction: &NewTransaction,
    created_by: UserId,
    connection: &Connection,
) -> Result<FinancialTransaction, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO financial_transaction (
            financial_year_id, club_member_id, credit, debit, transaction_date,
            description, created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        (
            new_transaction.financial_year_id,
            new_transaction.club_member_id,
            new_transaction.credit,
            new_transaction.debit,
            new_transaction.transaction_date,
            &new_transaction.description,
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(FinancialTransaction {
        id: connection.last_insert_rowid(),
        financial_year_id: new_transaction.financial_year_id,
        club_member_id: new_transaction.club_member_id,
        credit: new_transaction.credit,
        debit: new_transaction.debit,
        transaction_date: new_transaction.transaction_date,
        description: new_transaction.description.clone(),
    })
}

/// Get the transactions of `financial_year_id`, newest first.
pub fn get_transactions(
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<FinancialTransaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM financial_transaction
            WHERE financial_year_id = :financial_year_id
            ORDER BY transaction_date DESC, id DESC"
        ))?
        .query_map(
            rusqlite::named_params! {":financial_year_id": financial_year_id},
            map_row_to_transaction,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        club::{NewClub, insert_club},
        database_id::DatabaseId,
        db::initialize,
        financial_year::insert_financial_year,
        member::insert_admin_member,
    };

    use super::{NewTransaction, get_transactions, insert_transaction};

    fn get_test_connection() -> (Connection, UserId, DatabaseId, DatabaseId) {
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
        let member = insert_admin_member(club.id, user.id, &connection)
            .expect("Could not create test member");
        let year = insert_financial_year(
            club.id,
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            user.id,
            &connection,
        )
        .expect("Could not create test financial year");

        (connection, user.id, year.id, member.id)
    }

    #[test]
    fn insert_transaction_succeeds() {
        let (connection, user_id, year_id, member_id) = get_test_connection();
        let new_transaction = NewTransaction {
            financial_year_id: year_id,
            club_member_id: Some(member_id),
            credit: Some(10_000.0),
            debit: None,
            transaction_date: date!(2025 - 03 - 05),
            description: "March contribution".to_owned(),
        };

        let transaction = insert_transaction(&new_transaction, user_id, &connection).unwrap();

        assert_eq!(
            get_transactions(year_id, &connection),
            Ok(vec![transaction])
        );
    }

    #[test]
    fn get_transactions_orders_newest_first() {
        let (connection, user_id, year_id, _) = get_test_connection();
        let older = insert_transaction(
            &NewTransaction {
                financial_year_id: year_id,
                club_member_id: None,
                credit: Some(5_000.0),
                debit: None,
                transaction_date: date!(2025 - 01 - 10),
                description: "January deposit".to_owned(),
            },
            user_id,
            &connection,
        )
        .unwrap();
        let newer = insert_transaction(
            &NewTransaction {
                financial_year_id: year_id,
                club_member_id: None,
                credit: None,
                debit: Some(2_000.0),
                transaction_date: date!(2025 - 02 - 10),
                description: "Stationery".to_owned(),
            },
            user_id,
            &connection,
        )
        .unwrap();

        let transactions = get_transactions(year_id, &connection).unwrap();

        assert_eq!(transactions, vec![newer, older]);
    }

    #[test]
    fn transaction_without_member_is_allowed() {
        let (connection, user_id, year_id, _) = get_test_connection();
        let new_transaction = NewTransaction {
            financial_year_id: year_id,
            club_member_id: None,
            credit: None,
            debit: Some(2_000.0),
            transaction_date: date!(2025 - 03 - 05),
            description: "Bank charges".to_owned(),
        };

        let transaction = insert_transaction(&new_transaction, user_id, &connection).unwrap();

        assert_eq!(transaction.club_member_id, None);
    }
}
