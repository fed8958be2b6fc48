//! Creates a financial year for a club and enrolls the creator as its first
//! participant.

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
    club::{FinancialYearForm, get_club_by_id, render_club_detail},
    database_id::DatabaseId,
    endpoints::{self, club_detail_url},
    financial_year::{FinancialYearState, insert_financial_year},
    member::get_member_of_club,
    participant::insert_participant,
};

/// The data submitted through the financial year creation form.
#[derive(Debug, Deserialize)]
pub struct CreateFinancialYearForm {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

pub(super) const INVALID_DATE_ERROR_MSG: &str = "Enter a valid date.";
pub(super) const END_BEFORE_START_ERROR_MSG: &str = "End date must be after the start date.";
pub(super) const DUPLICATE_YEAR_ERROR_MSG: &str =
    "A financial year with these dates already exists.";

fn parse_date(value: &str) -> Result<Date, ()> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| ())
}

fn validate_financial_year_form(form: &CreateFinancialYearForm) -> Result<(Date, Date), FinancialYearForm> {
    let mut display_form = FinancialYearForm {
        start_date: form.start_date.clone(),
        end_date: form.end_date.clone(),
        ..Default::default()
    };

    let start_date = parse_date(&form.start_date);
    let end_date = parse_date(&form.end_date);

    if start_date.is_err() {
        display_form.start_date_error = Some(INVALID_DATE_ERROR_MSG.to_owned());
    }

    if end_date.is_err() {
        display_form.end_date_error = Some(INVALID_DATE_ERROR_MSG.to_owned());
    }

    match (start_date, end_date) {
        (Ok(start), Ok(end)) if end <= start => {
            display_form.end_date_error = Some(END_BEFORE_START_ERROR_MSG.to_owned());
            Err(display_form)
        }
        (Ok(start), Ok(end)) => Ok((start, end)),
        _ => Err(display_form),
    }
}

/// Creates a financial year for the club.
///
/// The creator's club membership is enrolled as the year's first participant.
/// Validation failures re-render the club detail page with the form filled in.
pub async fn post_create_financial_year(
    State(state): State<FinancialYearState>,
    Extension(acting_user): Extension<UserId>,
    Path(club_id): Path<DatabaseId>,
    Form(form): Form<CreateFinancialYearForm>,
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

    let (start_date, end_date) = match validate_financial_year_form(&form) {
        Ok(dates) => dates,
        Err(display_form) => return render_club_detail(club_id, &display_form, &connection),
    };

    let financial_year =
        match insert_financial_year(club_id, start_date, end_date, acting_user, &connection) {
            Ok(financial_year) => financial_year,
            Err(Error::DuplicateFinancialYear) => {
                let display_form = FinancialYearForm {
                    start_date: form.start_date,
                    end_date: form.end_date,
                    start_date_error: Some(DUPLICATE_YEAR_ERROR_MSG.to_owned()),
                    ..Default::default()
                };

                return render_club_detail(club_id, &display_form, &connection);
            }
            Err(error) => return Err(error),
        };

    match get_member_of_club(club_id, acting_user, &connection) {
        Ok(member) => {
            insert_participant(financial_year.id, member.id, acting_user, &connection)?;
        }
        Err(Error::NotFound) => {}
        Err(error) => return Err(error),
    }

    Ok(Redirect::to(&club_detail_url(club_id)).into_response())
}
