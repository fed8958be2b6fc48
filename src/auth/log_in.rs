//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        DEFAULT_COOKIE_DURATION, User, get_user_by_email, invalidate_auth_cookie,
        redirect::normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, log_in_container, password_input},
    timezone::get_local_offset,
};

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

fn log_in_page(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Response {
    let log_in_form = log_in_form(email, error_message, redirect_url);
    let content = log_in_container("Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");

    log_in_page("", None, redirect_url.as_deref())
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Nairobi".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the clubs page (or the requested redirect URL).
/// Otherwise, the form is returned with an error message explaining the problem.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let user: User = match get_user_by_email(
        &user_data.email,
        &state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection"),
    ) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            // Do not reveal whether the email is registered.
            return log_in_page(
                &user_data.email,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            );
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_page(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            );
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_page(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            );
        }
    };

    if !is_password_valid {
        return log_in_page(
            &user_data.email,
            Some(INVALID_CREDENTIALS_ERROR_MSG),
            redirect_url,
        );
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::CLUBS_VIEW);

    set_auth_cookie(jar.clone(), user.id, cookie_duration, local_timezone)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                [(axum::http::header::LOCATION, redirect_url.to_owned())],
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::SEE_OTHER,
                [(
                    axum::http::header::LOCATION,
                    endpoints::LOG_IN_VIEW.to_owned(),
                )],
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, create_user, create_user_table,
        },
        endpoints,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LoginState, REMEMBER_ME_COOKIE_DURATION, get_log_in_page,
        post_log_in,
    };

    const TEST_EMAIL: &str = "jane.doe@example.com";
    const TEST_PASSWORD: &str = "test";

    fn get_test_state(with_user: bool) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            let password_hash = PasswordHash::new(
                crate::auth::ValidatedPassword::new_unchecked(TEST_PASSWORD),
                4,
            )
            .expect("Could not hash test password");
            create_user(TEST_EMAIL, password_hash, &connection)
                .expect("Could not create test user");
        }

        LoginState {
            cookie_key: crate::app_state::create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: LoginState) -> TestServer {
        let app = Router::new()
            .route(
                endpoints::LOG_IN_VIEW,
                get(get_log_in_page).post(post_log_in),
            )
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server(get_test_state(true));
        let form = [("email", TEST_EMAIL), ("password", TEST_PASSWORD)];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::CLUBS_VIEW);
        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert!(token_cookie.expires_datetime().unwrap() > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let server = get_test_server(get_test_state(true));
        let redirect_url = "/clubs/1";
        let form = [
            ("email", TEST_EMAIL),
            ("password", TEST_PASSWORD),
            ("redirect_url", redirect_url),
        ];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let server = get_test_server(get_test_state(true));
        let form = [
            ("email", TEST_EMAIL),
            ("password", TEST_PASSWORD),
            ("redirect_url", "https://example.com"),
        ];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::CLUBS_VIEW);
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie() {
        let server = get_test_server(get_test_state(true));
        let form = [
            ("email", TEST_EMAIL),
            ("password", TEST_PASSWORD),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let token_cookie = response.cookie(COOKIE_TOKEN);
        let expires = token_cookie.expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;
        assert!(
            (expires - want).abs() < Duration::seconds(2),
            "got cookie expiry {expires:?}, want {want:?}"
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let server = get_test_server(get_test_state(true));
        let form = [("email", TEST_EMAIL), ("password", "wrongpassword")];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status_ok();
        response.assert_text_contains(INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state(false));
        let form = [("email", "nobody@example.com"), ("password", TEST_PASSWORD)];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        response.assert_status_ok();
        response.assert_text_contains(INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = get_test_server(get_test_state(false));

        server
            .post(endpoints::LOG_IN_VIEW)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
