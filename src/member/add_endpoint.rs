//! Adds a registered user to a club after a successful lookup.

use axum::{
    Extension,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    Error,
    auth::{UserId, get_user_by_email},
    club::get_club_by_id,
    database_id::DatabaseId,
    endpoints::{self, club_detail_url},
    member::{get_or_create_member, is_club_admin},
};

use super::lookup_endpoint::MemberState;

/// The email of the user to add, carried over from the lookup result page.
#[derive(Debug, Deserialize)]
pub struct AddMemberQuery {
    pub email: String,
}

/// Adds the user with the given email to the club as an unconfirmed member.
///
/// Adding the same user twice is a no-op. Non-admins and unknown emails fall
/// through to the club detail redirect without changing anything.
pub async fn get_add_member(
    State(state): State<MemberState>,
    Extension(acting_user): Extension<UserId>,
    Path(club_id): Path<DatabaseId>,
    Query(query): Query<AddMemberQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match get_club_by_id(club_id, &connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    }

    if is_club_admin(club_id, acting_user, &connection)? {
        match get_user_by_email(query.email.trim(), &connection) {
            Ok(user) => {
                get_or_create_member(club_id, user.id, acting_user, &connection)?;
            }
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    Ok(Redirect::to(&club_detail_url(club_id)).into_response())
}

#[cfg(test)]
mod add_member_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        club::{NewClub, insert_club},
        db::initialize,
        endpoints::club_detail_url,
        member::{get_club_members, get_member_of_club, insert_admin_member},
    };

    use super::{AddMemberQuery, MemberState, get_add_member};

    struct Fixture {
        state: MemberState,
        club_id: i64,
        admin: UserId,
        other_user: UserId,
    }

    fn get_test_fixture() -> Fixture {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let admin = create_user(
            "admin@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let other_user = create_user(
            "new.member@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let club = insert_club(
            &NewClub {
                name: "Umoja Investments".to_owned(),
                description: String::new(),
                contact_email: String::new(),
                contact_phone: String::new(),
            },
            admin.id,
            &connection,
        )
        .unwrap();
        insert_admin_member(club.id, admin.id, &connection).unwrap();

        Fixture {
            state: MemberState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            club_id: club.id,
            admin: admin.id,
            other_user: other_user.id,
        }
    }

    #[tokio::test]
    async fn add_member_creates_membership_and_redirects() {
        let fixture = get_test_fixture();

        let response = get_add_member(
            State(fixture.state.clone()),
            Extension(fixture.admin),
            Path(fixture.club_id),
            Query(AddMemberQuery {
                email: "new.member@example.com".to_owned(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            &club_detail_url(fixture.club_id)
        );

        let connection = fixture.state.db_connection.lock().unwrap();
        let member = get_member_of_club(fixture.club_id, fixture.other_user, &connection)
            .expect("expected the user to be a club member");
        assert!(!member.is_admin);
        assert!(!member.is_confirmed);
    }

    #[tokio::test]
    async fn adding_the_same_user_twice_is_a_no_op() {
        let fixture = get_test_fixture();

        for _ in 0..2 {
            get_add_member(
                State(fixture.state.clone()),
                Extension(fixture.admin),
                Path(fixture.club_id),
                Query(AddMemberQuery {
                    email: "new.member@example.com".to_owned(),
                }),
            )
            .await
            .unwrap();
        }

        let connection = fixture.state.db_connection.lock().unwrap();
        let members = get_club_members(fixture.club_id, 25, &connection).unwrap();
        assert_eq!(members.len(), 2, "want admin plus one added member");
    }

    #[tokio::test]
    async fn non_admin_cannot_add_members() {
        let fixture = get_test_fixture();

        let response = get_add_member(
            State(fixture.state.clone()),
            Extension(fixture.other_user),
            Path(fixture.club_id),
            Query(AddMemberQuery {
                email: "new.member@example.com".to_owned(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = fixture.state.db_connection.lock().unwrap();
        let result = get_member_of_club(fixture.club_id, fixture.other_user, &connection);
        assert!(result.is_err(), "want no membership, got {result:?}");
    }
}
