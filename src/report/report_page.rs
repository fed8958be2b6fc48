//! The monthly report page for a financial year.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    club::{Club, get_club_by_id},
    database_id::DatabaseId,
    endpoints::{self, financial_year_url},
    financial_year::{FinancialYear, get_financial_year},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    report::{MonthlyReport, build_monthly_report},
    timezone::local_date_now,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The state needed for the report route.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month picked through the report's query string.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<String>,
}

fn month_name(month: u8) -> &'static str {
    MONTH_NAMES[usize::from(month - 1)]
}

fn month_picker(club_id: DatabaseId, financial_year_id: DatabaseId, selected: u8) -> Markup {
    let report_url = financial_year_url(endpoints::REPORTS_VIEW, club_id, financial_year_id);

    html! {
        nav class="flex flex-wrap gap-2"
        {
            @for month in 1..=12u8 {
                @if month == selected {
                    span class="font-bold" { (month_name(month)) }
                } @else {
                    a href=(format!("{report_url}?month={month}")) class=(LINK_STYLE)
                    {
                        (month_name(month))
                    }
                }
            }
        }
    }
}

fn report_view(club: &Club, financial_year: &FinancialYear, report: &MonthlyReport) -> Markup {
    let nav_bar = NavBar::new(endpoints::CLUBS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-2 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold"
                {
                    (club.name) ": " (month_name(report.month)) " report"
                }

                a
                    href=(financial_year_url(endpoints::FINANCIAL_YEAR_VIEW, club.id, financial_year.id))
                    class=(LINK_STYLE)
                {
                    "Back to financial year"
                }

                (month_picker(club.id, financial_year.id, report.month))
            }

            section class="space-y-2 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Totals" }

                dl class="space-y-1"
                {
                    div { dt class="font-medium inline" { "Money in: " } dd #sum-credit class="inline" { (format_currency(report.sum_credit)) } }
                    div { dt class="font-medium inline" { "Money out: " } dd #sum-debit class="inline" { (format_currency(report.sum_debit)) } }
                    div { dt class="font-medium inline" { "Due per participant: " } dd #total-due class="inline" { (format_currency(report.total_due)) } }
                }
            }

            section class="space-y-2 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Participants" }

                ul class="space-y-1"
                {
                    @for row in &report.participants {
                        li { (row.email.as_deref().unwrap_or("(deleted user)")) }
                    }

                    @if report.participants.is_empty() {
                        li class="text-gray-500 dark:text-gray-400" { "No participants yet." }
                    }
                }
            }

            section class="space-y-2 w-full lg:max-w-3xl mt-8"
            {
                h2 class="text-lg font-bold" { "Transactions" }

                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Credit" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Debit" }
                        }
                    }

                    tbody
                    {
                        @for transaction in &report.transactions {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (transaction.transaction_date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(credit) = transaction.credit {
                                        (format_currency(credit))
                                    }
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(debit) = transaction.debit {
                                        (format_currency(debit))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Monthly report", &content)
}

/// Renders the monthly report.
///
/// A missing or out-of-range `month` query parameter falls back to the
/// current month in the configured timezone.
pub async fn get_report_page(
    State(state): State<ReportState>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let month = query
        .month
        .as_deref()
        .and_then(|month| month.trim().parse::<u8>().ok())
        .filter(|month| (1..=12).contains(month));

    let month = match month {
        Some(month) => month,
        None => {
            let today = local_date_now(&state.local_timezone)
                .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

            u8::from(today.month())
        }
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let club = match get_club_by_id(club_id, &connection) {
        Ok(club) => club,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    };
    let financial_year = match get_financial_year(club_id, financial_year_id, &connection) {
        Ok(financial_year) => financial_year,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    };

    let report = build_monthly_report(&financial_year, month, &connection)?;

    Ok(report_view(&club, &financial_year, &report).into_response())
}

#[cfg(test)]
mod report_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        club::{NewClub, insert_club},
        contribution::{DuePeriod, insert_contribution},
        db::initialize,
        endpoints,
        financial_year::insert_financial_year,
        member::insert_admin_member,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{NewTransaction, insert_transaction},
    };

    use super::{ReportQuery, ReportState, get_report_page};

    struct Fixture {
        state: ReportState,
        club_id: i64,
        financial_year_id: i64,
    }

    fn get_test_fixture() -> Fixture {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let user = create_user(
            "jane.doe@example.com",
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
            user.id,
            &connection,
        )
        .unwrap();
        insert_admin_member(club.id, user.id, &connection).unwrap();
        let financial_year = insert_financial_year(
            club.id,
            date!(2024 - 01 - 01),
            date!(2024 - 12 - 31),
            user.id,
            &connection,
        )
        .unwrap();
        insert_contribution(financial_year.id, 500.0, DuePeriod::Monthly, user.id, &connection)
            .unwrap();
        insert_test_transaction(&connection, financial_year.id, user.id);

        Fixture {
            state: ReportState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Africa/Nairobi".to_owned(),
            },
            club_id: club.id,
            financial_year_id: financial_year.id,
        }
    }

    fn insert_test_transaction(connection: &Connection, financial_year_id: i64, user_id: UserId) {
        insert_transaction(
            &NewTransaction {
                financial_year_id,
                club_member_id: None,
                credit: Some(10_000.0),
                debit: None,
                transaction_date: date!(2024 - 03 - 05),
                description: "Bank deposit".to_owned(),
            },
            user_id,
            connection,
        )
        .unwrap();
    }

    fn element_text(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();

        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("expected an element matching {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn report_shows_totals_for_the_selected_month() {
        let fixture = get_test_fixture();

        let response = get_report_page(
            State(fixture.state),
            Path((fixture.club_id, fixture.financial_year_id)),
            Query(ReportQuery {
                month: Some("3".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(element_text(&html, "#sum-credit"), "$10,000.00");
        assert_eq!(element_text(&html, "#sum-debit"), "$0.00");
        // Three monthly periods of $500 have elapsed by March.
        assert_eq!(element_text(&html, "#total-due"), "$1,500.00");
    }

    #[tokio::test]
    async fn missing_month_defaults_to_the_current_month() {
        let fixture = get_test_fixture();

        let response = get_report_page(
            State(fixture.state),
            Path((fixture.club_id, fixture.financial_year_id)),
            Query(ReportQuery { month: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn out_of_range_month_defaults_to_the_current_month() {
        let fixture = get_test_fixture();

        let response = get_report_page(
            State(fixture.state),
            Path((fixture.club_id, fixture.financial_year_id)),
            Query(ReportQuery {
                month: Some("13".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_financial_year_redirects_to_clubs_index() {
        let fixture = get_test_fixture();

        let response = get_report_page(
            State(fixture.state),
            Path((fixture.club_id, 999)),
            Query(ReportQuery {
                month: Some("3".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::CLUBS_VIEW
        );
    }
}
