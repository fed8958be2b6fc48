//! Recurring contributions owed by each participant of a financial year.

mod core;
mod create_endpoint;

pub use core::{
    Contribution, DuePeriod, create_contribution_table, get_contributions,
    get_monthly_contributions, insert_contribution,
};
pub use create_endpoint::post_create_contribution;
