//! The route handler for creating a club.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use email_address::EmailAddress;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Deserialize;

use crate::{
    Error,
    auth::UserId,
    club::{
        NewClub,
        clubs_page::{CLUB_LIST_LIMIT, ClubForm, ClubState, clubs_view},
        get_clubs_created_by, insert_club,
    },
    endpoints,
    member::{admin_count, insert_admin_member},
};

/// The raw data entered by the user in the club creation form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClubForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
}

pub(super) const NAME_REQUIRED_ERROR_MSG: &str = "This field is required.";
pub(super) const DUPLICATE_NAME_ERROR_MSG: &str = "A club with this name already exists.";
pub(super) const INVALID_EMAIL_ERROR_MSG: &str = "Enter a valid email address.";

fn validate_club_form(form: &CreateClubForm) -> Result<NewClub, ClubForm> {
    let name = form.name.trim().to_owned();
    let contact_email = form.contact_email.trim().to_owned();

    let name_error = name.is_empty().then(|| NAME_REQUIRED_ERROR_MSG.to_owned());
    let contact_email_error = (!contact_email.is_empty()
        && !EmailAddress::is_valid(&contact_email))
    .then(|| INVALID_EMAIL_ERROR_MSG.to_owned());

    if name_error.is_some() || contact_email_error.is_some() {
        return Err(ClubForm {
            name: form.name.clone(),
            description: form.description.clone(),
            contact_email: form.contact_email.clone(),
            contact_phone: form.contact_phone.clone(),
            name_error,
            contact_email_error,
        });
    }

    Ok(NewClub {
        name,
        description: form.description.trim().to_owned(),
        contact_email,
        contact_phone: form.contact_phone.trim().to_owned(),
    })
}

/// Create the club and its founding admin membership atomically.
fn create_club_with_admin(
    new_club: &NewClub,
    creator: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let club = insert_club(new_club, creator, &transaction)?;
    insert_admin_member(club.id, creator, &transaction)?;

    if admin_count(club.id, &transaction)? < 1 {
        return Err(Error::ClubWithoutAdmin);
    }

    transaction.commit()?;

    Ok(())
}

/// Handler for creating a club via the POST method.
///
/// On success the creator becomes the club's first admin member and the
/// client is redirected to the clubs index. Validation failures re-render the
/// clubs index with field errors, status OK.
pub async fn post_create_club(
    State(state): State<ClubState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<CreateClubForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let new_club = match validate_club_form(&form) {
        Ok(new_club) => new_club,
        Err(form_with_errors) => {
            let clubs = get_clubs_created_by(user_id, CLUB_LIST_LIMIT, &connection)?;
            return Ok(clubs_view(&clubs, &form_with_errors).into_response());
        }
    };

    match create_club_with_admin(&new_club, user_id, &connection) {
        Ok(()) => Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(Error::DuplicateClubName) => {
            let form_with_errors = ClubForm {
                name: form.name,
                description: form.description,
                contact_email: form.contact_email,
                contact_phone: form.contact_phone,
                name_error: Some(DUPLICATE_NAME_ERROR_MSG.to_owned()),
                contact_email_error: None,
            };
            let clubs = get_clubs_created_by(user_id, CLUB_LIST_LIMIT, &connection)?;
            Ok(clubs_view(&clubs, &form_with_errors).into_response())
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod create_club_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        club::{clubs_page::ClubState, get_clubs_created_by},
        db::initialize,
        endpoints,
        member::admin_count,
        test_utils::parse_html_document,
    };

    use super::{
        CreateClubForm, DUPLICATE_NAME_ERROR_MSG, INVALID_EMAIL_ERROR_MSG, NAME_REQUIRED_ERROR_MSG,
        post_create_club,
    };

    fn get_test_state() -> (ClubState, UserId) {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            "jane.doe@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            ClubState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn club_form(name: &str) -> CreateClubForm {
        CreateClubForm {
            name: name.to_owned(),
            description: "Chama".to_owned(),
            contact_email: "club@example.com".to_owned(),
            contact_phone: "+254700000000".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_club_redirects_and_creates_admin_member() {
        let (state, user_id) = get_test_state();

        let response = post_create_club(
            State(state.clone()),
            Extension(user_id),
            Form(club_form("Umoja Investments")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::CLUBS_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        let clubs = get_clubs_created_by(user_id, 10, &connection).unwrap();
        assert_eq!(clubs.len(), 1);
        assert_eq!(admin_count(clubs[0].id, &connection), Ok(1));
    }

    #[tokio::test]
    async fn create_club_rejects_empty_name() {
        let (state, user_id) = get_test_state();

        let response = post_create_club(
            State(state.clone()),
            Extension(user_id),
            Form(club_form("   ")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let text = html.html();
        assert!(
            text.contains(NAME_REQUIRED_ERROR_MSG),
            "expected name error message in response"
        );

        let connection = state.db_connection.lock().unwrap();
        let clubs = get_clubs_created_by(user_id, 10, &connection).unwrap();
        assert!(clubs.is_empty(), "no club should be created");
    }

    #[tokio::test]
    async fn create_club_rejects_malformed_contact_email() {
        let (state, user_id) = get_test_state();
        let form = CreateClubForm {
            contact_email: "not-an-email".to_owned(),
            ..club_form("Umoja Investments")
        };

        let response = post_create_club(State(state.clone()), Extension(user_id), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(
            html.html().contains(INVALID_EMAIL_ERROR_MSG),
            "expected contact email error message in response"
        );
    }

    #[tokio::test]
    async fn create_club_rejects_duplicate_name() {
        let (state, user_id) = get_test_state();

        post_create_club(
            State(state.clone()),
            Extension(user_id),
            Form(club_form("Umoja Investments")),
        )
        .await
        .unwrap();

        let response = post_create_club(
            State(state.clone()),
            Extension(user_id),
            Form(club_form("Umoja Investments")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(
            html.html().contains(DUPLICATE_NAME_ERROR_MSG),
            "expected duplicate name error message in response"
        );

        let connection = state.db_connection.lock().unwrap();
        let clubs = get_clubs_created_by(user_id, 10, &connection).unwrap();
        assert_eq!(clubs.len(), 1, "only the first club should exist");
    }
}
