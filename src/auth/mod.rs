mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use user::{User, UserId, create_user, create_user_table, get_user_by_email, get_user_by_id};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
