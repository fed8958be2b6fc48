//! Displays the requester's clubs and the club creation form.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    club::{Club, get_clubs_created_by},
    endpoints::{self, club_detail_url},
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, text_input,
    },
    navigation::NavBar,
};

/// The most clubs shown on the clubs index.
pub(super) const CLUB_LIST_LIMIT: u32 = 10;

/// The state needed for the clubs index route handlers.
#[derive(Debug, Clone)]
pub struct ClubState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClubState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The club creation form's fields and per-field error messages.
#[derive(Debug, Default, Clone, PartialEq)]
pub(super) struct ClubForm {
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub name_error: Option<String>,
    pub contact_email_error: Option<String>,
}

fn create_club_form(form: &ClubForm) -> Markup {
    html! {
        form method="post" action=(endpoints::CLUBS_VIEW) class="space-y-4"
        {
            (text_input("name", "Name", &form.name, form.name_error.as_deref()))
            (text_input("description", "Description", &form.description, None))
            (text_input(
                "contact_email",
                "Contact email",
                &form.contact_email,
                form.contact_email_error.as_deref(),
            ))
            (text_input("contact_phone", "Contact phone", &form.contact_phone, None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create club" }
        }
    }
}

pub(super) fn clubs_view(clubs: &[Club], form: &ClubForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::CLUBS_VIEW).into_html();

    let table_row = |club: &Club| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    a href=(club_detail_url(club.id)) class=(LINK_STYLE) { (club.name) }
                }

                td class=(TABLE_CELL_STYLE) { (club.status) }

                td class=(TABLE_CELL_STYLE) { (club.description) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { "Your Clubs" }

                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        }
                    }

                    tbody
                    {
                        @for club in clubs {
                            (table_row(club))
                        }

                        @if clubs.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "You have not created any clubs yet."
                                }
                            }
                        }
                    }
                }
            }

            section class="space-y-4 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Create a club" }

                (create_club_form(form))
            }
        }
    );

    base("Clubs", &content)
}

/// Renders the clubs index for the requesting user.
pub async fn get_clubs_page(
    State(state): State<ClubState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let clubs = get_clubs_created_by(user_id, CLUB_LIST_LIMIT, &connection)
        .inspect_err(|error| tracing::error!("could not get clubs: {error}"))?;

    Ok(clubs_view(&clubs, &ClubForm::default()).into_response())
}
