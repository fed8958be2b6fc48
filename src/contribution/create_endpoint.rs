//! Adds a recurring contribution to a financial year.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    Error,
    auth::UserId,
    contribution::{DuePeriod, insert_contribution},
    database_id::DatabaseId,
    financial_year::{
        ContributionForm, FinancialYearPageForms, FinancialYearState, get_financial_year,
        render_financial_year_page,
    },
};

/// The data submitted through the contribution form.
#[derive(Debug, Deserialize)]
pub struct CreateContributionForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub due_period: String,
}

pub(super) const INVALID_AMOUNT_ERROR_MSG: &str = "Enter a valid amount.";
pub(super) const INVALID_DUE_PERIOD_ERROR_MSG: &str = "Select a valid due period.";

fn validate_contribution_form(
    form: &CreateContributionForm,
) -> Result<(f64, DuePeriod), ContributionForm> {
    let mut display_form = ContributionForm {
        amount: form.amount.clone(),
        due_period: form.due_period.clone(),
        ..Default::default()
    };

    let amount = match form.amount.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
        _ => {
            display_form.amount_error = Some(INVALID_AMOUNT_ERROR_MSG.to_owned());
            None
        }
    };

    let due_period = match DuePeriod::from_str(form.due_period.trim()) {
        Some(due_period) => Some(due_period),
        None => {
            display_form.due_period_error = Some(INVALID_DUE_PERIOD_ERROR_MSG.to_owned());
            None
        }
    };

    match (amount, due_period) {
        (Some(amount), Some(due_period)) => Ok((amount, due_period)),
        _ => Err(display_form),
    }
}

/// Adds a contribution to the financial year and re-renders the detail page.
pub async fn post_create_contribution(
    State(state): State<FinancialYearState>,
    Extension(acting_user): Extension<UserId>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
    Form(form): Form<CreateContributionForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let financial_year = match get_financial_year(club_id, financial_year_id, &connection) {
        Ok(financial_year) => Some(financial_year),
        Err(Error::NotFound) => None,
        Err(error) => return Err(error),
    };

    let forms = match (financial_year, validate_contribution_form(&form)) {
        (Some(financial_year), Ok((amount, due_period))) => {
            insert_contribution(financial_year.id, amount, due_period, acting_user, &connection)?;

            FinancialYearPageForms::default()
        }
        (_, Err(display_form)) => FinancialYearPageForms {
            contribution: display_form,
            ..Default::default()
        },
        (None, Ok(_)) => FinancialYearPageForms::default(),
    };

    render_financial_year_page(club_id, financial_year_id, &forms, &connection)
}
