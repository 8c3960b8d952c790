//! Row <-> domain conversions for the sessions_sea adapter.
//!
//! Decoding failures surface as `DbErr::Custom` with the corrupt-row prefix
//! so the repos layer can classify them.

use std::str::FromStr;

use sea_orm::{DbErr, NotSet, Set};
use time::OffsetDateTime;

use crate::domain::clock::ElapsedTimes;
use crate::domain::ledger::Turn;
use crate::domain::players::{Player, PlayerColor, PlayerId};
use crate::domain::snapshot::SessionSnapshot;
use crate::entities::{session_players, sessions, turns};
use crate::infra::db_errors::CORRUPT_ROW_PREFIX;

fn corrupt(detail: impl std::fmt::Display) -> DbErr {
    DbErr::Custom(format!("{CORRUPT_ROW_PREFIX}{detail}"))
}

/// Millisecond counters are stored signed; values past `i64::MAX` saturate.
pub fn ms_to_db(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Totals are stored as `INTEGER`; a total that does not fit is refused
/// rather than truncated.
pub fn vp_to_db(total_vp: u32) -> Result<i32, DbErr> {
    i32::try_from(total_vp)
        .map_err(|_| DbErr::Custom(format!("total VP {total_vp} exceeds the stored range")))
}

fn ms_from_db(column: &str, ms: i64) -> Result<u64, DbErr> {
    u64::try_from(ms).map_err(|_| corrupt(format!("{column} is negative ({ms})")))
}

pub fn player_active(
    session_id: i64,
    seat: usize,
    player: &Player,
    now: OffsetDateTime,
) -> Result<session_players::ActiveModel, DbErr> {
    let turn_order =
        i16::try_from(seat).map_err(|_| DbErr::Custom(format!("seat {seat} out of range")))?;
    Ok(session_players::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        player_uid: Set(player.id.to_string()),
        turn_order: Set(turn_order),
        display_name: Set(player.name.clone()),
        side: Set(player.side.clone()),
        color: Set(player.color.map(|c| c.as_str().to_string())),
        background_image: Set(player.background_image.clone()),
        total_vp: Set(vp_to_db(player.total_vp)?),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// Pending VP is never stored; a loaded player starts with none.
pub fn player_from_row(row: session_players::Model) -> Result<Player, DbErr> {
    let id = PlayerId::from_str(&row.player_uid)
        .map_err(|_| corrupt(format!("player_uid '{}'", row.player_uid)))?;
    let color = row
        .color
        .as_deref()
        .map(PlayerColor::from_str)
        .transpose()
        .map_err(|_| corrupt(format!("color for player {id}")))?;
    let total_vp = u32::try_from(row.total_vp)
        .map_err(|_| corrupt(format!("total_vp {} for player {id}", row.total_vp)))?;

    Ok(Player {
        id,
        name: row.display_name,
        side: row.side,
        color,
        background_image: row.background_image,
        total_vp,
        pending_vp: 0,
    })
}

pub fn turn_active(session_id: i64, turn_no: i32, turn: &Turn) -> turns::ActiveModel {
    turns::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        turn_no: Set(turn_no),
        player_uid: Set(turn.player_id.to_string()),
        duration_ms: Set(ms_to_db(turn.duration_ms)),
        vp_deltas: Set(serde_json::Value::from(turn.vp_deltas.clone())),
        played_at: Set(turn.played_at),
    }
}

pub fn turn_from_row(row: turns::Model) -> Result<Turn, DbErr> {
    let player_id = PlayerId::from_str(&row.player_uid)
        .map_err(|_| corrupt(format!("turn {} player_uid '{}'", row.turn_no, row.player_uid)))?;
    let vp_deltas: Vec<i32> = serde_json::from_value(row.vp_deltas)
        .map_err(|e| corrupt(format!("turn {} vp_deltas: {e}", row.turn_no)))?;
    Ok(Turn::new(
        player_id,
        ms_from_db("duration_ms", row.duration_ms)?,
        row.played_at,
        vp_deltas,
    ))
}

pub fn snapshot_from_row(row: &sessions::Model) -> Result<SessionSnapshot, DbErr> {
    Ok(SessionSnapshot {
        elapsed: ElapsedTimes {
            turn_ms: ms_from_db("turn_elapsed_ms", row.turn_elapsed_ms)?,
            game_ms: ms_from_db("game_elapsed_ms", row.game_elapsed_ms)?,
            total_ms: ms_from_db("total_elapsed_ms", row.total_elapsed_ms)?,
        },
        completed: row.completed,
    })
}
