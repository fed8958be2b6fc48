//! The clubs index, club creation and the club detail page.

mod clubs_page;
mod core;
mod create_endpoint;
mod detail_page;

pub use clubs_page::{ClubState, get_clubs_page};
pub use core::{
    Club, ClubStatus, NewClub, create_club_table, get_club_by_id, get_clubs_created_by,
    insert_club,
};
pub use create_endpoint::post_create_club;
pub use detail_page::get_club_detail_page;

pub(crate) use detail_page::{FinancialYearForm, render_club_detail};
