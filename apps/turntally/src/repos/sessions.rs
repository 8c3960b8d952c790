//! SeaORM-backed session store.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::debug;

use super::SessionStore;
use crate::adapters::sessions_sea as sessions_adapter;
use crate::adapters::sessions_sea::dto;
use crate::domain::ledger::Turn;
use crate::domain::players::{Player, PlayerId};
use crate::domain::snapshot::{LoadedSession, SessionId, SessionSnapshot, SessionSummary};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_db_err;

#[derive(Debug, Clone)]
pub struct SeaSessionStore {
    db: DatabaseConnection,
}

impl SeaSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl SessionStore for SeaSessionStore {
    async fn create_session(&self, players: &[Player]) -> Result<SessionId, DomainError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let session = sessions_adapter::create_session(&txn, players)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;
        debug!(session_id = session.id, players = players.len(), "session created");
        Ok(session.id)
    }

    async fn load_session(&self, id: SessionId) -> Result<LoadedSession, DomainError> {
        let session = sessions_adapter::require_session(&self.db, id)
            .await
            .map_err(map_db_err)?;
        let snapshot = dto::snapshot_from_row(&session).map_err(map_db_err)?;

        let players = sessions_adapter::players_for(&self.db, id)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(dto::player_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_err)?;

        let turns = sessions_adapter::turns_for(&self.db, id)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(dto::turn_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_err)?;

        Ok(LoadedSession {
            id,
            players,
            turns,
            snapshot,
        })
    }

    async fn append_turn(&self, id: SessionId, turn: &Turn) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        sessions_adapter::require_session(&txn, id)
            .await
            .map_err(map_db_err)?;
        let next_no = sessions_adapter::last_turn_no(&txn, id)
            .await
            .map_err(map_db_err)?
            .map_or(1, |n| n + 1);
        sessions_adapter::insert_turns(&txn, id, next_no, std::slice::from_ref(turn))
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)
    }

    async fn replace_turns(&self, id: SessionId, turns: &[Turn]) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        sessions_adapter::require_session(&txn, id)
            .await
            .map_err(map_db_err)?;
        let removed = sessions_adapter::delete_turns(&txn, id)
            .await
            .map_err(map_db_err)?;
        sessions_adapter::insert_turns(&txn, id, 1, turns)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;
        debug!(session_id = id, removed, written = turns.len(), "ledger replaced");
        Ok(())
    }

    async fn update_player_totals(
        &self,
        id: SessionId,
        player_id: PlayerId,
        total_vp: u32,
    ) -> Result<(), DomainError> {
        sessions_adapter::update_player_total(&self.db, id, player_id, total_vp)
            .await
            .map_err(map_db_err)
    }

    async fn save_session_snapshot(
        &self,
        id: SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), DomainError> {
        sessions_adapter::update_snapshot(&self.db, id, snapshot)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, DomainError> {
        let sessions = sessions_adapter::list_sessions(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut out = Vec::with_capacity(sessions.len());
        for s in sessions {
            let player_count = sessions_adapter::count_players(&self.db, s.id)
                .await
                .map_err(map_db_err)?;
            let turn_count = sessions_adapter::count_turns(&self.db, s.id)
                .await
                .map_err(map_db_err)?;
            out.push(SessionSummary {
                id: s.id,
                completed: s.completed,
                player_count: player_count as usize,
                turn_count: turn_count as usize,
                created_at: s.created_at,
            });
        }
        Ok(out)
    }
}
