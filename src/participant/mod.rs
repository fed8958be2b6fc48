//! Financial year participants: which club members take part in a year.

mod core;
mod create_endpoint;

pub use core::{
    Participant, ParticipantListRow, create_participant_table, get_participants,
    insert_participant,
};
pub use create_endpoint::post_create_participant;
