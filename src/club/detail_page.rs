//! Displays a club's members, the member lookup form and the financial year forms.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    club::{Club, clubs_page::ClubState, get_club_by_id},
    database_id::DatabaseId,
    endpoints::{self, financial_year_url, format_endpoint},
    financial_year::{FinancialYear, get_financial_years_for_club},
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_input, text_input,
    },
    member::{MemberListRow, get_club_members},
    navigation::NavBar,
};

/// The most members shown on the club detail page.
const MEMBER_LIST_LIMIT: u32 = 25;

/// The financial year creation form's fields and per-field error messages.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FinancialYearForm {
    pub start_date: String,
    pub end_date: String,
    pub start_date_error: Option<String>,
    pub end_date_error: Option<String>,
}

fn member_lookup_form(club_id: DatabaseId) -> Markup {
    html! {
        form
            method="post"
            action=(format_endpoint(endpoints::MEMBER_LOOKUP, club_id))
            class="space-y-4"
        {
            (text_input("email", "Email", "", None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Look up member" }
        }
    }
}

fn financial_year_form(club_id: DatabaseId, form: &FinancialYearForm) -> Markup {
    html! {
        form
            method="post"
            action=(format_endpoint(endpoints::NEW_FINANCIAL_YEAR, club_id))
            class="space-y-4"
        {
            (date_input("start_date", "Start date", &form.start_date, form.start_date_error.as_deref()))
            (date_input("end_date", "End date", &form.end_date, form.end_date_error.as_deref()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create financial year" }
        }
    }
}

fn members_table(members: &[MemberListRow]) -> Markup {
    html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Admin" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Confirmed" }
                }
            }

            tbody
            {
                @for row in members {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        th
                            scope="row"
                            class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                        {
                            (row.email.as_deref().unwrap_or("(deleted user)"))
                        }

                        td class=(TABLE_CELL_STYLE) { (row.member.role) }
                        td class=(TABLE_CELL_STYLE) { (if row.member.is_admin { "Yes" } else { "No" }) }
                        td class=(TABLE_CELL_STYLE) { (if row.member.is_confirmed { "Yes" } else { "No" }) }
                    }
                }

                @if members.is_empty() {
                    tr
                    {
                        td
                            colspan="4"
                            class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            "This club has no members yet."
                        }
                    }
                }
            }
        }
    }
}

fn financial_years_list(club_id: DatabaseId, financial_years: &[FinancialYear]) -> Markup {
    html! {
        ul class="space-y-2"
        {
            @for year in financial_years {
                li
                {
                    a
                        href=(financial_year_url(endpoints::FINANCIAL_YEAR_VIEW, club_id, year.id))
                        class=(LINK_STYLE)
                    {
                        (year.start_date) " to " (year.end_date)
                    }
                }
            }

            @if financial_years.is_empty() {
                li class="text-gray-500 dark:text-gray-400" { "No financial years yet." }
            }
        }
    }
}

fn club_detail_view(
    club: &Club,
    members: &[MemberListRow],
    financial_years: &[FinancialYear],
    fy_form: &FinancialYearForm,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CLUBS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-2 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { (club.name) }
                p class="text-gray-500 dark:text-gray-400" { (club.description) }
                p { "Status: " (club.status) }
                @if !club.contact_email.is_empty() {
                    p { "Contact: " (club.contact_email) }
                }
            }

            section class="space-y-4 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Members" }
                (members_table(members))
            }

            section class="space-y-4 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Find a member" }
                (member_lookup_form(club.id))
            }

            section class="space-y-4 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Financial years" }
                (financial_years_list(club.id, financial_years))
                (financial_year_form(club.id, fy_form))
            }
        }
    );

    base(&club.name, &content)
}

/// Render the club detail page, or a redirect to the clubs index if `club_id`
/// does not resolve.
pub(crate) fn render_club_detail(
    club_id: DatabaseId,
    fy_form: &FinancialYearForm,
    connection: &Connection,
) -> Result<Response, Error> {
    let club = match get_club_by_id(club_id, connection) {
        Ok(club) => club,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    };
    let members = get_club_members(club.id, MEMBER_LIST_LIMIT, connection)?;
    let financial_years = get_financial_years_for_club(club.id, connection)?;

    Ok(club_detail_view(&club, &members, &financial_years, fy_form).into_response())
}

/// Renders the club detail page.
pub async fn get_club_detail_page(
    State(state): State<ClubState>,
    Path(club_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    render_club_detail(club_id, &FinancialYearForm::default(), &connection)
}
