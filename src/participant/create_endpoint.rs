//! Enrolls a club member as a participant of a financial year.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    Error,
    auth::UserId,
    database_id::DatabaseId,
    endpoints::{self, financial_year_url},
    financial_year::{
        FinancialYearPageForms, FinancialYearState, get_financial_year,
        render_financial_year_page,
    },
    participant::insert_participant,
};

/// The data submitted through the add-participant form.
#[derive(Debug, Deserialize)]
pub struct CreateParticipantForm {
    #[serde(default)]
    pub club_member_id: String,
}

pub(super) const DUPLICATE_PARTICIPANT_ERROR_MSG: &str =
    "This member is already a participant.";
pub(super) const INVALID_MEMBER_ERROR_MSG: &str = "Select a valid member.";

/// Enrolls a club member in the financial year.
///
/// Redirects to the detail page on success. Duplicate enrollments and unknown
/// members re-render the page with an error instead.
pub async fn post_create_participant(
    State(state): State<FinancialYearState>,
    Extension(acting_user): Extension<UserId>,
    Path((club_id, financial_year_id)): Path<(DatabaseId, DatabaseId)>,
    Form(form): Form<CreateParticipantForm>,
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

    let participant_error = match form.club_member_id.trim().parse::<DatabaseId>() {
        Ok(club_member_id) => {
            match insert_participant(financial_year.id, club_member_id, acting_user, &connection) {
                Ok(_) => {
                    return Ok(Redirect::to(&financial_year_url(
                        endpoints::FINANCIAL_YEAR_VIEW,
                        club_id,
                        financial_year.id,
                    ))
                    .into_response());
                }
                Err(Error::DuplicateParticipant) => DUPLICATE_PARTICIPANT_ERROR_MSG,
                Err(Error::InvalidForeignKey) => INVALID_MEMBER_ERROR_MSG,
                Err(error) => return Err(error),
            }
        }
        Err(_) => INVALID_MEMBER_ERROR_MSG,
    };

    let forms = FinancialYearPageForms {
        participant_error: Some(participant_error.to_owned()),
        ..Default::default()
    };

    render_financial_year_page(club_id, financial_year.id, &forms, &connection)
}
