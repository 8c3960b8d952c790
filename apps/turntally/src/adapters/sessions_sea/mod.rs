//! SeaORM adapter for session persistence - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::domain::ledger::Turn;
use crate::domain::players::{Player, PlayerId};
use crate::domain::snapshot::SessionSnapshot;
use crate::entities::{session_players, sessions, turns};
use crate::infra::db_errors::SESSION_NOT_FOUND_PREFIX;

pub mod dto;

// Adapter functions return DbErr; the repos layer maps to DomainError.

fn session_not_found(session_id: i64) -> DbErr {
    DbErr::Custom(format!("{SESSION_NOT_FOUND_PREFIX}{session_id}"))
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    players: &[Player],
) -> Result<sessions::Model, DbErr> {
    let now = OffsetDateTime::now_utc();
    let session = sessions::ActiveModel {
        id: NotSet,
        completed: Set(false),
        turn_elapsed_ms: Set(0),
        game_elapsed_ms: Set(0),
        total_elapsed_ms: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        completed_at: Set(None),
    }
    .insert(conn)
    .await?;

    for (seat, player) in players.iter().enumerate() {
        dto::player_active(session.id, seat, player, now)?
            .insert(conn)
            .await?;
    }
    Ok(session)
}

pub async fn find_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<sessions::Model>, DbErr> {
    sessions::Entity::find_by_id(session_id).one(conn).await
}

/// Find a session or fail with the structured not-found error.
pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<sessions::Model, DbErr> {
    find_session(conn, session_id)
        .await?
        .ok_or_else(|| session_not_found(session_id))
}

pub async fn list_sessions<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<sessions::Model>, DbErr> {
    sessions::Entity::find()
        .order_by_asc(sessions::Column::Id)
        .all(conn)
        .await
}

/// Players in seat order.
pub async fn players_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<session_players::Model>, DbErr> {
    session_players::Entity::find()
        .filter(session_players::Column::SessionId.eq(session_id))
        .order_by_asc(session_players::Column::TurnOrder)
        .all(conn)
        .await
}

/// Turns in ledger order.
pub async fn turns_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<turns::Model>, DbErr> {
    turns::Entity::find()
        .filter(turns::Column::SessionId.eq(session_id))
        .order_by_asc(turns::Column::TurnNo)
        .all(conn)
        .await
}

pub async fn count_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<u64, DbErr> {
    session_players::Entity::find()
        .filter(session_players::Column::SessionId.eq(session_id))
        .count(conn)
        .await
}

pub async fn count_turns<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<u64, DbErr> {
    turns::Entity::find()
        .filter(turns::Column::SessionId.eq(session_id))
        .count(conn)
        .await
}

/// Highest stored turn number, if any.
pub async fn last_turn_no<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<i32>, DbErr> {
    let last = turns::Entity::find()
        .filter(turns::Column::SessionId.eq(session_id))
        .order_by_desc(turns::Column::TurnNo)
        .limit(1)
        .one(conn)
        .await?;
    Ok(last.map(|t| t.turn_no))
}

/// Insert turns numbered consecutively from `first_turn_no`.
pub async fn insert_turns<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    first_turn_no: i32,
    turns: &[Turn],
) -> Result<(), DbErr> {
    for (offset, turn) in turns.iter().enumerate() {
        let offset = i32::try_from(offset)
            .map_err(|_| DbErr::Custom(format!("too many turns for session {session_id}")))?;
        dto::turn_active(session_id, first_turn_no + offset, turn)
            .insert(conn)
            .await?;
    }
    Ok(())
}

pub async fn delete_turns<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<u64, DbErr> {
    let res = turns::Entity::delete_many()
        .filter(turns::Column::SessionId.eq(session_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

pub async fn update_player_total<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    player_id: PlayerId,
    total_vp: u32,
) -> Result<(), DbErr> {
    let res = session_players::Entity::update_many()
        .col_expr(
            session_players::Column::TotalVp,
            Expr::value(dto::vp_to_db(total_vp)?),
        )
        .col_expr(
            session_players::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(session_players::Column::SessionId.eq(session_id))
        .filter(session_players::Column::PlayerUid.eq(player_id.to_string()))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        require_session(conn, session_id).await?;
        return Err(DbErr::RecordNotFound(format!(
            "Player {player_id} not found in session {session_id}"
        )));
    }
    Ok(())
}

/// Overwrite the elapsed counters and completion flag. `completed_at` is
/// stamped the first time the session is saved as completed.
pub async fn update_snapshot<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    snapshot: &SessionSnapshot,
) -> Result<sessions::Model, DbErr> {
    let current = require_session(conn, session_id).await?;
    let now = OffsetDateTime::now_utc();
    let newly_completed = snapshot.completed && current.completed_at.is_none();

    let mut active: sessions::ActiveModel = current.into();
    active.completed = Set(snapshot.completed);
    active.turn_elapsed_ms = Set(dto::ms_to_db(snapshot.elapsed.turn_ms));
    active.game_elapsed_ms = Set(dto::ms_to_db(snapshot.elapsed.game_ms));
    active.total_elapsed_ms = Set(dto::ms_to_db(snapshot.elapsed.total_ms));
    active.updated_at = Set(now);
    if newly_completed {
        active.completed_at = Set(Some(now));
    }
    active.update(conn).await
}
