use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// A club member's enrollment in a financial year.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// The id for the enrollment row.
    pub id: DatabaseId,
    /// The financial year the member is enrolled in.
    pub financial_year_id: DatabaseId,
    /// The enrolled club member.
    pub club_member_id: DatabaseId,
    pub is_active: bool,
}

/// A participant joined with the member's email for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantListRow {
    pub participant: Participant,
    /// The participant's email. `None` once the user account has been deleted.
    pub email: Option<String>,
}

pub fn create_participant_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_year_participant (
            id INTEGER PRIMARY KEY,
            financial_year_id INTEGER NOT NULL
                REFERENCES financial_year(id) ON DELETE CASCADE,
            club_member_id INTEGER NOT NULL
                REFERENCES club_member(id) ON DELETE CASCADE,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            updated_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            UNIQUE (financial_year_id, club_member_id)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_participant(row: &rusqlite::Row) -> Result<Participant, rusqlite::Error> {
    Ok(Participant {
        id: row.get(0)?,
        financial_year_id: row.get(1)?,
        club_member_id: row.get(2)?,
        is_active: row.get(3)?,
    })
}

/// Enroll `club_member_id` in `financial_year_id`.
///
/// # Errors
/// Returns:
/// - [Error::DuplicateParticipant] if the member is already enrolled.
/// - [Error::InvalidForeignKey] if either id does not resolve.
pub fn insert_participant(
    financial_year_id: DatabaseId,
    club_member_id: DatabaseId,
    created_by: UserId,
    connection: &Connection,
) -> Result<Participant, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO financial_year_participant (
            financial_year_id, club_member_id, is_active,
            created_at, updated_at, created_by, updated_by
        ) VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6)",
        (
            financial_year_id,
            club_member_id,
            now,
            now,
            created_by.as_i64(),
            created_by.as_i64(),
        ),
    )?;

    Ok(Participant {
        id: connection.last_insert_rowid(),
        financial_year_id,
        club_member_id,
        is_active: true,
    })
}

/// Get the participants of `financial_year_id` with their emails, oldest enrollment first.
pub fn get_participants(
    financial_year_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<ParticipantListRow>, Error> {
    connection
        .prepare(
            "SELECT financial_year_participant.id,
                financial_year_participant.financial_year_id,
                financial_year_participant.club_member_id,
                financial_year_participant.is_active,
                user.email
            FROM financial_year_participant
            JOIN club_member ON club_member.id = financial_year_participant.club_member_id
            LEFT JOIN user ON user.id = club_member.user_id
            WHERE financial_year_participant.financial_year_id = :financial_year_id
            ORDER BY financial_year_participant.created_at ASC, financial_year_participant.id ASC",
        )?
        .query_map(
            rusqlite::named_params! {":financial_year_id": financial_year_id},
            |row| {
                Ok(ParticipantListRow {
                    participant: map_row_to_participant(row)?,
                    email: row.get(4)?,
                })
            },
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod participant_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{PasswordHash, UserId, create_user},
        club::{NewClub, insert_club},
        database_id::DatabaseId,
        db::initialize,
        financial_year::insert_financial_year,
        member::insert_admin_member,
    };

    use super::{get_participants, insert_participant};

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
    fn insert_participant_succeeds() {
        let (connection, user_id, year_id, member_id) = get_test_connection();

        let participant =
            insert_participant(year_id, member_id, user_id, &connection).unwrap();

        let participants = get_participants(year_id, &connection).unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].participant, participant);
        assert_eq!(
            participants[0].email.as_deref(),
            Some("jane.doe@example.com")
        );
    }

    #[test]
    fn insert_participant_fails_when_already_enrolled() {
        let (connection, user_id, year_id, member_id) = get_test_connection();

        insert_participant(year_id, member_id, user_id, &connection).unwrap();
        let duplicate = insert_participant(year_id, member_id, user_id, &connection);

        assert_eq!(duplicate, Err(Error::DuplicateParticipant));
    }

    #[test]
    fn insert_participant_fails_with_unknown_member() {
        let (connection, user_id, year_id, _) = get_test_connection();

        let result = insert_participant(year_id, 999, user_id, &connection);

        assert_eq!(result, Err(Error::InvalidForeignKey));
    }
}
