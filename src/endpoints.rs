//! The application's route URIs.
//!
//! For endpoints that take parameters, e.g., '/clubs/{club_id}', use
//! [format_endpoint] (once per parameter, outermost first).

/// The root route which redirects to the clubs index or log in page.
pub const ROOT: &str = "/";
/// The log-in page; POST authenticates the requester.
pub const LOG_IN_VIEW: &str = "/accounts";
/// The route that invalidates the auth cookie and logs the requester out.
pub const LOG_OUT: &str = "/accounts/logout";
/// The clubs index: the requester's clubs plus the club creation form.
pub const CLUBS_VIEW: &str = "/clubs";
/// The club detail page: members, member lookup and financial year forms.
pub const CLUB_DETAIL_VIEW: &str = "/clubs/{club_id}";
/// The route for looking up a prospective member by email (admin only).
pub const MEMBER_LOOKUP: &str = "/clubs/{club_id}/member-lookup";
/// The route for adding a member to a club by email (admin only).
pub const ADD_MEMBER: &str = "/clubs/{club_id}/add-member";
/// The route for creating a financial year for a club.
pub const NEW_FINANCIAL_YEAR: &str = "/clubs/{club_id}/financial-year";
/// The financial year detail page: participants, dues and transactions.
pub const FINANCIAL_YEAR_VIEW: &str = "/clubs/{club_id}/financial-year/{financial_year_id}";
/// The route for adding a recurring contribution to a financial year.
pub const NEW_CONTRIBUTION: &str = "/clubs/{club_id}/financial-year/{financial_year_id}/due";
/// The route for adding a one-off charge against a member.
pub const NEW_INDIVIDUAL_DUE: &str =
    "/clubs/{club_id}/financial-year/{financial_year_id}/individual-due";
/// The route for recording a financial transaction.
pub const NEW_TRANSACTION: &str =
    "/clubs/{club_id}/financial-year/{financial_year_id}/transaction";
/// The route for enrolling a club member as a financial year participant.
pub const NEW_PARTICIPANT: &str =
    "/clubs/{club_id}/financial-year/{financial_year_id}/participant";
/// The monthly report page for a financial year.
pub const REPORTS_VIEW: &str = "/clubs/{club_id}/financial-year/{financial_year_id}/reports";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/clubs/{club_id}', '{club_id}' is the
/// parameter. Paths with two parameters are formatted by calling this
/// function twice, outermost parameter first.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// Format a club detail URL for `club_id`.
pub fn club_detail_url(club_id: i64) -> String {
    format_endpoint(CLUB_DETAIL_VIEW, club_id)
}

/// Format a financial-year-scoped URL such as [FINANCIAL_YEAR_VIEW] or
/// [REPORTS_VIEW] for `club_id` and `financial_year_id`.
pub fn financial_year_url(endpoint_path: &str, club_id: i64, financial_year_id: i64) -> String {
    format_endpoint(&format_endpoint(endpoint_path, club_id), financial_year_id)
}

// These tests are here so that we know the formatted paths parse as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::{financial_year_url, format_endpoint};

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::CLUBS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CLUB_DETAIL_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MEMBER_LOOKUP);
        assert_endpoint_is_valid_uri(endpoints::ADD_MEMBER);
        assert_endpoint_is_valid_uri(endpoints::NEW_FINANCIAL_YEAR);
        assert_endpoint_is_valid_uri(endpoints::FINANCIAL_YEAR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_CONTRIBUTION);
        assert_endpoint_is_valid_uri(endpoints::NEW_INDIVIDUAL_DUE);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::NEW_PARTICIPANT);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/clubs/{club_id}", 1);

        assert_eq!(formatted_path, "/clubs/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/clubs/index", 1);

        assert_eq!(formatted_path, "/clubs/index");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn formats_nested_parameters_outermost_first() {
        let formatted_path = financial_year_url(endpoints::REPORTS_VIEW, 3, 7);

        assert_eq!(formatted_path, "/clubs/3/financial-year/7/reports");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
