//! Club membership: the membership model, member lookup and adding members.

mod add_endpoint;
mod core;
mod lookup_endpoint;

pub use add_endpoint::get_add_member;
pub use core::{
    ClubMember, MemberListRow, admin_count, create_club_member_table, get_club_members,
    get_member_of_club, get_or_create_member, insert_admin_member, is_club_admin,
};
pub use lookup_endpoint::post_member_lookup;
