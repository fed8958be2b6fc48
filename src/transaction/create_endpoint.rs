//! Records a ledger entry against a financial year.

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
        FinancialYearPageForms, FinancialYearState, TransactionForm, get_financial_year,
        render_financial_year_page,
    },
    transaction::{NewTransaction, insert_transaction},
};

/// The data submitted through the transaction form.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionForm {
    #[serde(default)]
    pub club_member_id: String,
    #[serde(default)]
    pub credit: String,
    #[serde(default)]
    pub debit: String,
    #[serde(default)]
    pub transaction_date: String,
    #[serde(default)]
    pub description: String,
}

pub(super) const INVALID_AMOUNT_ERROR_MSG: &str = "Enter a valid amount.";
pub(super) const INVALID_DATE_ERROR_MSG: &str = "Enter a valid date.";
pub(super) const DESCRIPTION_REQUIRED_ERROR_MSG: &str = "This field is required.";

struct ValidatedTransaction {
    club_member_id: Option<DatabaseId>,
    credit: Option<f64>,
    debit: Option<f64>,
    transaction_date: Date,
    description: String,
}

/// Parse an optional currency amount. An empty field means no amount.
fn parse_amount(value: &str) -> Result<Option<f64>, ()> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(Some(amount)),
        _ => Err(()),
    }
}

fn validate_transaction_form(
    form: &CreateTransactionForm,
) -> Result<ValidatedTransaction, TransactionForm> {
    let mut display_form = TransactionForm {
        club_member_id: form.club_member_id.clone(),
        credit: form.credit.clone(),
        debit: form.debit.clone(),
        transaction_date: form.transaction_date.clone(),
        description: form.description.clone(),
        ..Default::default()
    };
    let mut is_valid = true;

    // The member drop-down offers a blank option, so an unparsable id is
    // treated the same as no member.
    let club_member_id = form.club_member_id.trim().parse::<DatabaseId>().ok();

    let credit = parse_amount(&form.credit).unwrap_or_else(|_| {
        display_form.credit_error = Some(INVALID_AMOUNT_ERROR_MSG.to_owned());
        is_valid = false;
        None
    });

    let debit = parse_amount(&form.debit).unwrap_or_else(|_| {
        display_form.debit_error = Some(INVALID_AMOUNT_ERROR_MSG.to_owned());
        is_valid = false;
        None
    });

    let transaction_date = Date::parse(
        form.transaction_date.trim(),
        format_description!("[year]-[month]-[day]"),
    )
    .ok();
    if transaction_date.is_none() {
        display_form.transaction_date_error = Some(INVALID_DATE_ERROR_MSG.to_owned());
        is_valid = false;
    }

    let description = form.description.trim();
    if description.is_empty() {
        display_form.description_error = Some(DESCRIPTION_REQUIRED_ERROR_MSG.to_owned());
        is_valid = false;
    }

    match transaction_date {
        Some(transaction_date) if is_valid => Ok(ValidatedTransaction {
            club_member_id,
            credit,
            debit,
            transaction_date,
            description: description.to_owned(),
        }),
        _ => Err(display_form),
    }
}

/// Records a transaction against the financial year.
///
/// A transaction may carry a credit, a debit, both or neither. Redirects to
/// the detail page on success, re-renders it with field errors otherwise.
pub async fn post_create_transaction(
    State(state): State<FinancialYearState>,
    Extension(acting_user): Extension<UserId>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
    Form(form): Form<CreateTransactionForm>,
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

    let validated = match validate_transaction_form(&form) {
        Ok(validated) => validated,
        Err(display_form) => {
            let forms = FinancialYearPageForms {
                transaction: display_form,
                ..Default::default()
            };

            return render_financial_year_page(club_id, financial_year.id, &forms, &connection);
        }
    };

    let new_transaction = NewTransaction {
        financial_year_id: financial_year.id,
        club_member_id: validated.club_member_id,
        credit: validated.credit,
        debit: validated.debit,
        transaction_date: validated.transaction_date,
        description: validated.description,
    };

    insert_transaction(&new_transaction, acting_user, &connection)?;

    Ok(Redirect::to(&financial_year_url(
        endpoints::FINANCIAL_YEAR_VIEW,
        club_id,
        financial_year.id,
    ))
    .into_response())
}
