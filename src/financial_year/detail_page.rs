//! The financial year detail page: participants, contributions, individual
//! dues, the transaction ledger and the forms for adding to each.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    club::{Club, get_club_by_id},
    contribution::{Contribution, DuePeriod, get_contributions},
    database_id::DatabaseId,
    endpoints::{self, club_detail_url, financial_year_url},
    financial_year::{FinancialYear, get_financial_year},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, amount_input,
        base, date_input, format_currency, text_input,
    },
    individual_due::{IndividualDueListRow, get_individual_dues},
    member::{MemberListRow, get_club_members},
    navigation::NavBar,
    participant::{ParticipantListRow, get_participants},
    transaction::{FinancialTransaction, get_transactions},
};

/// The most members offered in the member drop-downs.
const MEMBER_SELECT_LIMIT: u32 = 25;

/// The state needed for the financial year routes.
#[derive(Debug, Clone)]
pub struct FinancialYearState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FinancialYearState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The contribution form's fields and per-field error messages.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct ContributionForm {
    pub amount: String,
    pub due_period: String,
    pub amount_error: Option<String>,
    pub due_period_error: Option<String>,
}

/// The individual due form's fields and per-field error messages.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct IndividualDueForm {
    pub club_member_id: String,
    pub description: String,
    pub amount: String,
    pub due_date: String,
    pub member_error: Option<String>,
    pub description_error: Option<String>,
    pub amount_error: Option<String>,
    pub due_date_error: Option<String>,
}

/// The transaction form's fields and per-field error messages.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct TransactionForm {
    pub club_member_id: String,
    pub credit: String,
    pub debit: String,
    pub transaction_date: String,
    pub description: String,
    pub credit_error: Option<String>,
    pub debit_error: Option<String>,
    pub transaction_date_error: Option<String>,
    pub description_error: Option<String>,
}

/// The display state of every form on the financial year detail page.
///
/// A create endpoint that fails validation re-renders the page with its own
/// form filled in and the others left at their defaults.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FinancialYearPageForms {
    pub contribution: ContributionForm,
    pub individual_due: IndividualDueForm,
    pub transaction: TransactionForm,
    pub participant_error: Option<String>,
}

fn member_select(
    name: &str,
    label: &str,
    members: &[MemberListRow],
    selected: &str,
    include_blank: bool,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select name=(name) id=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                @if include_blank {
                    option value="" selected[selected.is_empty()] { "(none)" }
                }

                @for row in members {
                    option
                        value=(row.member.id)
                        selected[selected == row.member.id.to_string()]
                    {
                        (row.email.as_deref().unwrap_or("(deleted user)"))
                    }
                }
            }

            @if let Some(message) = error_message {
                p class="text-red-500 text-base" { (message) }
            }
        }
    }
}

fn participants_section(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    participants: &[ParticipantListRow],
    members: &[MemberListRow],
    error_message: Option<&str>,
) -> Markup {
    html! {
        section class="space-y-4 w-full lg:max-w-3xl mt-8"
        {
            h2 class="text-lg font-bold" { "Participants" }

            ul class="space-y-2"
            {
                @for row in participants {
                    li { (row.email.as_deref().unwrap_or("(deleted user)")) }
                }

                @if participants.is_empty() {
                    li class="text-gray-500 dark:text-gray-400" { "No participants yet." }
                }
            }

            form
                method="post"
                action=(financial_year_url(endpoints::NEW_PARTICIPANT, club_id, financial_year_id))
                class="space-y-4"
            {
                (member_select("club_member_id", "Member", members, "", false, error_message))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add participant" }
            }
        }
    }
}

fn contributions_section(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    contributions: &[Contribution],
    form: &ContributionForm,
) -> Markup {
    html! {
        section class="space-y-4 w-full lg:max-w-3xl mt-8"
        {
            h2 class="text-lg font-bold" { "Contributions" }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Due period" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for contribution in contributions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (contribution.due_period) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(contribution.amount)) }
                        }
                    }
                }
            }

            form
                method="post"
                action=(financial_year_url(endpoints::NEW_CONTRIBUTION, club_id, financial_year_id))
                class="space-y-4"
            {
                (amount_input("amount", "Amount", &form.amount, form.amount_error.as_deref()))

                div
                {
                    label for="due_period" class=(FORM_LABEL_STYLE) { "Due period" }

                    select name="due_period" id="due_period" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for period in DuePeriod::ALL {
                            option
                                value=(period.as_str())
                                selected[form.due_period == period.as_str()]
                            {
                                (period)
                            }
                        }
                    }

                    @if let Some(message) = &form.due_period_error {
                        p class="text-red-500 text-base" { (message) }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add contribution" }
            }
        }
    }
}

fn individual_dues_section(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    dues: &[IndividualDueListRow],
    members: &[MemberListRow],
    form: &IndividualDueForm,
) -> Markup {
    html! {
        section class="space-y-4 w-full lg:max-w-3xl mt-8"
        {
            h2 class="text-lg font-bold" { "Individual dues" }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Member" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Due date" }
                    }
                }

                tbody
                {
                    @for row in dues {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.email.as_deref().unwrap_or("(deleted user)")) }
                            td class=(TABLE_CELL_STYLE) { (row.due.description) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(row.due.amount)) }
                            td class=(TABLE_CELL_STYLE) { (row.due.due_date) }
                        }
                    }
                }
            }

            form
                method="post"
                action=(financial_year_url(endpoints::NEW_INDIVIDUAL_DUE, club_id, financial_year_id))
                class="space-y-4"
            {
                (member_select(
                    "club_member_id",
                    "Member",
                    members,
                    &form.club_member_id,
                    false,
                    form.member_error.as_deref(),
                ))
                (text_input("description", "Description", &form.description, form.description_error.as_deref()))
                (amount_input("amount", "Amount", &form.amount, form.amount_error.as_deref()))
                (date_input("due_date", "Due date", &form.due_date, form.due_date_error.as_deref()))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add individual due" }
            }
        }
    }
}

fn transactions_section(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    transactions: &[FinancialTransaction],
    members: &[MemberListRow],
    form: &TransactionForm,
) -> Markup {
    html! {
        section class="space-y-4 w-full lg:max-w-3xl mt-8"
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
                    @for transaction in transactions {
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

            form
                method="post"
                action=(financial_year_url(endpoints::NEW_TRANSACTION, club_id, financial_year_id))
                class="space-y-4"
            {
                (member_select("club_member_id", "Member", members, &form.club_member_id, true, None))
                (amount_input("credit", "Credit", &form.credit, form.credit_error.as_deref()))
                (amount_input("debit", "Debit", &form.debit, form.debit_error.as_deref()))
                (date_input(
                    "transaction_date",
                    "Date",
                    &form.transaction_date,
                    form.transaction_date_error.as_deref(),
                ))
                (text_input("description", "Description", &form.description, form.description_error.as_deref()))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add transaction" }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn financial_year_view(
    club: &Club,
    financial_year: &FinancialYear,
    participants: &[ParticipantListRow],
    contributions: &[Contribution],
    dues: &[IndividualDueListRow],
    transactions: &[FinancialTransaction],
    members: &[MemberListRow],
    forms: &FinancialYearPageForms,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CLUBS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-2 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold"
                {
                    (club.name) ": " (financial_year.start_date) " to " (financial_year.end_date)
                }

                a href=(club_detail_url(club.id)) class=(LINK_STYLE) { "Back to club" }

                a
                    href=(financial_year_url(endpoints::REPORTS_VIEW, club.id, financial_year.id))
                    class=(LINK_STYLE)
                {
                    "Monthly report"
                }
            }

            (participants_section(
                club.id,
                financial_year.id,
                participants,
                members,
                forms.participant_error.as_deref(),
            ))
            (contributions_section(club.id, financial_year.id, contributions, &forms.contribution))
            (individual_dues_section(club.id, financial_year.id, dues, members, &forms.individual_due))
            (transactions_section(club.id, financial_year.id, transactions, members, &forms.transaction))
        }
    );

    base("Financial year", &content)
}

/// Render the financial year detail page, or a redirect to the clubs index if
/// the club or year does not resolve.
pub(crate) fn render_financial_year_page(
    club_id: DatabaseId,
    financial_year_id: DatabaseId,
    forms: &FinancialYearPageForms,
    connection: &Connection,
) -> Result<Response, Error> {
    let club = match get_club_by_id(club_id, connection) {
        Ok(club) => club,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    };
    let financial_year = match get_financial_year(club_id, financial_year_id, connection) {
        Ok(financial_year) => financial_year,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response()),
        Err(error) => return Err(error),
    };

    let participants = get_participants(financial_year.id, connection)?;
    let contributions = get_contributions(financial_year.id, connection)?;
    let dues = get_individual_dues(financial_year.id, connection)?;
    let transactions = get_transactions(financial_year.id, connection)?;
    let members = get_club_members(club.id, MEMBER_SELECT_LIMIT, connection)?;

    Ok(financial_year_view(
        &club,
        &financial_year,
        &participants,
        &contributions,
        &dues,
        &transactions,
        &members,
        forms,
    )
    .into_response())
}

/// Renders the financial year detail page.
pub async fn get_financial_year_page(
    State(state): State<FinancialYearState>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    render_financial_year_page(
        club_id,
        financial_year_id,
        &FinancialYearPageForms::default(),
        &connection,
    )
}
