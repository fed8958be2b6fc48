//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{AuthState, auth_guard, get_log_in_page, get_log_out, post_log_in},
    club::{get_club_detail_page, get_clubs_page, post_create_club},
    contribution::post_create_contribution,
    endpoints,
    financial_year::{get_financial_year_page, post_create_financial_year},
    individual_due::post_create_individual_due,
    member::{get_add_member, post_member_lookup},
    not_found::get_404_not_found,
    participant::post_create_participant,
    report::get_report_page,
    transaction::post_create_transaction,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CLUBS_VIEW, get(get_clubs_page).post(post_create_club))
        .route(endpoints::CLUB_DETAIL_VIEW, get(get_club_detail_page))
        .route(endpoints::MEMBER_LOOKUP, post(post_member_lookup))
        .route(endpoints::ADD_MEMBER, get(get_add_member))
        .route(
            endpoints::NEW_FINANCIAL_YEAR,
            post(post_create_financial_year),
        )
        .route(endpoints::FINANCIAL_YEAR_VIEW, get(get_financial_year_page))
        .route(endpoints::NEW_CONTRIBUTION, post(post_create_contribution))
        .route(
            endpoints::NEW_INDIVIDUAL_DUE,
            post(post_create_individual_due),
        )
        .route(endpoints::NEW_TRANSACTION, post(post_create_transaction))
        .route(endpoints::NEW_PARTICIPANT, post(post_create_participant))
        .route(endpoints::REPORTS_VIEW, get(get_report_page))
        .layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the clubs page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CLUBS_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, routing::build_router};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        let state = AppState::new(connection, "42", "Africa/Nairobi")
            .expect("Could not create app state");
        let app = build_router(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn protected_routes_redirect_unauthenticated_clients_to_log_in() {
        let server = get_test_server();

        for endpoint in [endpoints::ROOT, endpoints::CLUBS_VIEW, "/clubs/1"] {
            let response = server.get(endpoint).await;

            response.assert_status_see_other();
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with(endpoints::LOG_IN_VIEW),
                "want redirect to log-in, got {location}"
            );
        }
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_authentication() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        let response = server.get("/no-such-page").await;

        response.assert_status_not_found();
    }
}
