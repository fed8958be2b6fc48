use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// A user's membership of a club.
#[derive(Debug, Clone, PartialEq)]
pub struct ClubMember {
    /// The id for the membership row.
    pub id: DatabaseId,
    /// The club the membership belongs to.
    pub club_id: DatabaseId,
    /// The member's user id. `None` once the user account has been deleted.
    pub user_id: Option<UserId>,
    /// Whether the member can manage the club.
    pub is_admin: bool,
    pub is_active: bool,
    pub is_confirmed: bool,
    /// A free-form role label, e.g. "chairperson".
    pub role: String,
}

/// A club member joined with the user's email for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberListRow {
    pub member: ClubMember,
    /// The member's email. `None` once the user account has been deleted.
    pub email: Option<String>,
}

pub fn create_club_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS club_member (
            id INTEGER PRIMARY KEY,
            user_id INTEGER REFERENCES user(id) ON DELETE SET NULL,
            club_id INTEGER NOT NULL REFERENCES club(id) ON DELETE CASCADE,
            is_admin INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_confirmed INTEGER NOT NULL DEFAULT 0,
            role TEXT NOT NULL DEFAULT 'member',
            invited_by INTEGER REFERENCES user(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, club_id)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_member(row: &rusqlite::Row) -> Result<ClubMember, rusqlite::Error> {
    let user_id: Option<i64> = row.get(2)?;

    Ok(ClubMember {
        id: row.get(0)?,
        club_id: row.get(1)?,
        user_id: user_id.map(UserId::new),
        is_admin: row.get(3)?,
        is_active: row.get(4)?,
        is_confirmed: row.get(5)?,
        role: row.get(6)?,
    })
}

const MEMBER_COLUMNS: &str =
    "club_member.id, club_member.club_id, club_member.user_id, club_member.is_admin, \
    club_member.is_active, club_member.is_confirmed, club_member.role";

/// Insert the founding admin membership for a club's creator.
///
/// The creator's membership is confirmed immediately.
///
/// # Errors
/// Returns [Error::DuplicateMember] if the user is already a member of the club.
pub fn insert_admin_member(
    club_id: DatabaseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<ClubMember, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO club_member (
            user_id, club_id, is_admin, is_active, is_confirmed, role,
            invited_by, created_at, updated_at
        ) VALUES (?1, ?2, 1, 1, 1, 'admin', ?3, ?4, ?5)",
        (user_id.as_i64(), club_id, user_id.as_i64(), now, now),
    )?;

    Ok(ClubMember {
        id: connection.last_insert_rowid(),
        club_id,
        user_id: Some(user_id),
        is_admin: true,
        is_active: true,
        is_confirmed: true,
        role: "admin".to_owned(),
    })
}

/// Get the membership row for `user_id` in `club_id`, creating a non-admin
/// membership if one does not exist.
///
/// Calling this twice for the same user and club returns the same row.
pub fn get_or_create_member(
    club_id: DatabaseId,
    user_id: UserId,
    invited_by: UserId,
    connection: &Connection,
) -> Result<ClubMember, Error> {
    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT OR IGNORE INTO club_member (
            user_id, club_id, is_admin, is_active, is_confirmed, role,
            invited_by, created_at, updated_at
        ) VALUES (?1, ?2, 0, 1, 0, 'member', ?3, ?4, ?5)",
        (user_id.as_i64(), club_id, invited_by.as_i64(), now, now),
    )?;

    connection
        .prepare(&format!(
            "SELECT {MEMBER_COLUMNS} FROM club_member
            WHERE user_id = :user_id AND club_id = :club_id"
        ))?
        .query_row(
            rusqlite::named_params! {":user_id": user_id.as_i64(), ":club_id": club_id},
            map_row_to_member,
        )
        .map_err(|error| error.into())
}

/// Get the membership row for `user_id` in `club_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the user is not a member of the club.
pub fn get_member_of_club(
    club_id: DatabaseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<ClubMember, Error> {
    connection
        .prepare(&format!(
            "SELECT {MEMBER_COLUMNS} FROM club_member
            WHERE user_id = :user_id AND club_id = :club_id"
        ))?
        .query_row(
            rusqlite::named_params! {":user_id": user_id.as_i64(), ":club_id": club_id},
            map_row_to_member,
        )
        .map_err(|error| error.into())
}

/// Whether `user_id` is an admin member of `club_id`.
pub fn is_club_admin(
    club_id: DatabaseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection
        .prepare(
            "SELECT COUNT(*) FROM club_member
            WHERE club_id = :club_id AND user_id = :user_id AND is_admin = 1",
        )?
        .query_row(
            rusqlite::named_params! {":club_id": club_id, ":user_id": user_id.as_i64()},
            |row| row.get(0),
        )?;

    Ok(count > 0)
}

/// The number of admin members in `club_id`.
pub fn admin_count(club_id: DatabaseId, connection: &Connection) -> Result<i64, Error> {
    connection
        .prepare("SELECT COUNT(*) FROM club_member WHERE club_id = :club_id AND is_admin = 1")?
        .query_row(rusqlite::named_params! {":club_id": club_id}, |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Get up to `limit` members of `club_id` with their emails, oldest membership first.
pub fn get_club_members(
    club_id: DatabaseId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<MemberListRow>, Error> {
    connection
        .prepare(&format!(
            "SELECT {MEMBER_COLUMNS}, user.email FROM club_member
            LEFT JOIN user ON user.id = club_member.user_id
            WHERE club_member.club_id = :club_id
            ORDER BY club_member.created_at ASC, club_member.id ASC
            LIMIT :limit"
        ))?
        .query_map(
            rusqlite::named_params! {":club_id": club_id, ":limit": limit},
            |row| {
                Ok(MemberListRow {
                    member: map_row_to_member(row)?,
                    email: row.get(7)?,
                })
            },
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}
