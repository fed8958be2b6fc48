//! Adds a one-off due against a single member of a financial year.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    auth::UserId,
    database_id::DatabaseId,
    endpoints::{self, financial_year_url},
    financial_year::{
        FinancialYearPageForms, FinancialYearState, IndividualDueForm, get_financial_year,
        render_financial_year_page,
    },
    individual_due::{NewIndividualDue, insert_individual_due},
};

/// The data submitted through the individual due form.
#[derive(Debug, Deserialize)]
pub struct CreateIndividualDueForm {
    #[serde(default)]
    pub club_member_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub due_date: String,
}

pub(super) const INVALID_MEMBER_ERROR_MSG: &str = "Select a valid member.";
pub(super) const DESCRIPTION_REQUIRED_ERROR_MSG: &str = "This field is required.";
pub(super) const INVALID_AMOUNT_ERROR_MSG: &str = "Enter a valid amount.";
pub(super) const INVALID_DATE_ERROR_MSG: &str = "Enter a valid date.";

struct ValidatedDue {
    club_member_id: DatabaseId,
    description: String,
    amount: f64,
    due_date: Date,
}

fn validate_due_form(form: &CreateIndividualDueForm) -> Result<ValidatedDue, IndividualDueForm> {
    let mut display_form = IndividualDueForm {
        club_member_id: form.club_member_id.clone(),
        description: form.description.clone(),
        amount: form.amount.clone(),
        due_date: form.due_date.clone(),
        ..Default::default()
    };

    let club_member_id = form.club_member_id.trim().parse::<DatabaseId>().ok();
    if club_member_id.is_none() {
        display_form.member_error = Some(INVALID_MEMBER_ERROR_MSG.to_owned());
    }

    let description = form.description.trim();
    if description.is_empty() {
        display_form.description_error = Some(DESCRIPTION_REQUIRED_ERROR_MSG.to_owned());
    }

    let amount = match form.amount.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
        _ => {
            display_form.amount_error = Some(INVALID_AMOUNT_ERROR_MSG.to_owned());
            None
        }
    };

    let due_date = Date::parse(
        form.due_date.trim(),
        format_description!("[year]-[month]-[day]"),
    )
    .ok();
    if due_date.is_none() {
        display_form.due_date_error = Some(INVALID_DATE_ERROR_MSG.to_owned());
    }

    match (club_member_id, amount, due_date) {
        (Some(club_member_id), Some(amount), Some(due_date)) if !description.is_empty() => {
            Ok(ValidatedDue {
                club_member_id,
                description: description.to_owned(),
                amount,
                due_date,
            })
        }
        _ => Err(display_form),
    }
}

/// Adds an individual due to the financial year.
///
/// Redirects to the detail page on success, re-renders it with field errors
/// otherwise.
pub async fn post_create_individual_due(
    State(state): State<FinancialYearState>,
    Extension(acting_user): Extension<UserId>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
    Form(form): Form<CreateIndividualDueForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let financial_year = match get_financial_year(club_id, financial_year_id, &connection) {
        Ok(financial_year) => financial_year,
        Err(Error::NotFound) => {
            return Ok(Redirect::to(endpoints::CLUBS_VIEW).into_response());
        }
        Err(error) => return Err(error),
    };

    let validated = match validate_due_form(&form) {
        Ok(validated) => validated,
        Err(display_form) => {
            let forms = FinancialYearPageForms {
                individual_due: display_form,
                ..Default::default()
            };

            return render_financial_year_page(club_id, financial_year.id, &forms, &connection);
        }
    };

    let new_due = NewIndividualDue {
        financial_year_id: financial_year.id,
        club_member_id: validated.club_member_id,
        description: validated.description,
        amount: validated.amount,
        due_date: validated.due_date,
    };

    match insert_individual_due(&new_due, acting_user, &connection) {
        Ok(_) => Ok(Redirect::to(&financial_year_url(
            endpoints::FINANCIAL_YEAR_VIEW,
            club_id,
            financial_year.id,
        ))
        .into_response()),
        Err(Error::InvalidForeignKey) => {
            let forms = FinancialYearPageForms {
                individual_due: IndividualDueForm {
                    club_member_id: form.club_member_id,
                    description: form.description,
                    amount: form.amount,
                    due_date: form.due_date,
                    member_error: Some(INVALID_MEMBER_ERROR_MSG.to_owned()),
                    ..Default::default()
                },
                ..Default::default()
            };

            render_financial_year_page(club_id, financial_year.id, &forms, &connection)
        }
        Err(error) => Err(error),
    }
}
