//! ClubLedger is a web app for managing investment clubs: membership,
//! financial years, contributions, dues and a monthly cash-flow report.
//!
//! This library provides a server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Redirect, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod club;
mod contribution;
mod database_id;
mod db;
mod endpoints;
mod financial_year;
mod html;
mod individual_due;
mod logging;
mod member;
mod navigation;
mod not_found;
mod participant;
mod report;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserId, ValidatedPassword, create_user, get_user_by_email};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{html::render_internal_server_error, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing or parsing the auth token.
    #[error("could not serialize the auth token as JSON: {0}")]
    JsonSerializationError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The requester is not an admin member of the club they tried to manage.
    #[error("the requester does not have permission to manage this club")]
    PermissionDenied,

    /// The email already belongs to a registered user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The club name already exists in the database.
    #[error("a club with this name already exists")]
    DuplicateClubName,

    /// The user is already a member of the club.
    #[error("the user is already a member of this club")]
    DuplicateMember,

    /// A financial year with the same club and date range already exists.
    #[error("a financial year with these dates already exists for this club")]
    DuplicateFinancialYear,

    /// The club member is already enrolled in the financial year.
    #[error("the member is already a participant in this financial year")]
    DuplicateParticipant,

    /// A query was given an id that does not refer to an existing row.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// A club ended up without any admin member, which violates the
    /// at-least-one-admin invariant.
    #[error("the club has no admin member")]
    ClubWithoutAdmin,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 =>
            {
                match desc {
                    desc if desc.contains("user.email") => Error::DuplicateEmail,
                    desc if desc.contains("club.name") => Error::DuplicateClubName,
                    desc if desc.contains("club_member.") => Error::DuplicateMember,
                    desc if desc.contains("financial_year_participant.") => {
                        Error::DuplicateParticipant
                    }
                    desc if desc.contains("financial_year.") => Error::DuplicateFinancialYear,
                    _ => Error::SqlError(rusqlite::Error::SqliteFailure(
                        sql_error,
                        Some(desc.to_owned()),
                    )),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Non-admins are silently sent back to the clubs index.
            Error::PermissionDenied => Redirect::to(endpoints::CLUBS_VIEW).into_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string."
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs.",
                )
            }
        }
    }
}
