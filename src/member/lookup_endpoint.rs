//! Looks up a registered user by email so a club admin can add them as a member.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::html;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{User, UserId, get_user_by_email},
    club::get_club_by_id,
    database_id::DatabaseId,
    endpoints::{self, club_detail_url, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    member::is_club_admin,
    navigation::NavBar,
};

/// The state needed for the member lookup route.
#[derive(Debug, Clone)]
pub struct MemberState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MemberState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The email submitted through the member lookup form.
#[derive(Debug, Deserialize)]
pub struct MemberLookupForm {
    pub email: String,
}

pub(super) const NO_USER_FOUND_ERROR_MSG: &str = "No user found with this email address.";

fn lookup_result_view(club_id: DatabaseId, result: Result<&User, &str>) -> Response {
    let nav_bar = NavBar::new(endpoints::CLUBS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { "Member lookup" }

                @match result {
                    Ok(user) => {
                        p { "Found a user with the email " (user.email) "." }

                        a
                            href=(add_member_url(club_id, &user.email))
                            class=(BUTTON_PRIMARY_STYLE)
                        {
                            "Add to club"
                        }
                    }
                    Err(message) => {
                        p class="text-red-500" { (message) }
                    }
                }

                a href=(club_detail_url(club_id)) class=(LINK_STYLE) { "Back to club" }
            }
        }
    );

    base("Member lookup", &content).into_response()
}

fn add_member_url(club_id: DatabaseId, email: &str) -> String {
    let query = serde_urlencoded::to_string([("email", email)])
        .unwrap_or_else(|_| format!("email={email}"));

    format!("{}?{query}", format_endpoint(endpoints::ADD_MEMBER, club_id))
}

/// Looks up a registered user by email on behalf of a club admin.
///
/// Non-admins are sent back to the club detail page without a lookup being
/// performed.
pub async fn post_member_lookup(
    State(state): State<MemberState>,
    Extension(acting_user): Extension<UserId>,
    Path(club_id): Path<DatabaseId>,
    Form(form): Form<MemberLookupForm>,
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

    if !is_club_admin(club_id, acting_user, &connection)? {
        return Ok(Redirect::to(&club_detail_url(club_id)).into_response());
    }

    match get_user_by_email(form.email.trim(), &connection) {
        Ok(user) => Ok(lookup_result_view(club_id, Ok(&user))),
        Err(Error::NotFound) => Ok(lookup_result_view(club_id, Err(NO_USER_FOUND_ERROR_MSG))),
        Err(error) => Err(error),
    }
}
