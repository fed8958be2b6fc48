//! One-off charges against individual club members.

mod core;
mod create_endpoint;

pub use core::{
    IndividualDue, IndividualDueListRow, NewIndividualDue, create_individual_due_table,
    get_individual_dues, insert_individual_due,
};
pub use create_endpoint::post_create_individual_due;
