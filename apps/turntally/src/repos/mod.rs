//! Persistence gateway: the operations the session core needs from storage.
//!
//! Implementations: [`memory::InMemoryStore`] for tests and headless runs,
//! and [`sessions::SeaSessionStore`] over SeaORM.

use async_trait::async_trait;

use crate::domain::ledger::Turn;
use crate::domain::players::{Player, PlayerId};
use crate::domain::snapshot::{LoadedSession, SessionId, SessionSnapshot, SessionSummary};
use crate::errors::domain::DomainError;

pub mod memory;
pub mod sessions;

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a new session with its seated players; returns its id.
    async fn create_session(&self, players: &[Player]) -> Result<SessionId, DomainError>;

    /// Load players (seat order), turns (ledger order) and the last snapshot.
    /// Unknown ids fail with `NotFound`.
    async fn load_session(&self, id: SessionId) -> Result<LoadedSession, DomainError>;

    /// Append one ledger entry after the stored ones.
    async fn append_turn(&self, id: SessionId, turn: &Turn) -> Result<(), DomainError>;

    /// Replace the stored ledger wholesale.
    async fn replace_turns(&self, id: SessionId, turns: &[Turn]) -> Result<(), DomainError>;

    async fn update_player_totals(
        &self,
        id: SessionId,
        player_id: PlayerId,
        total_vp: u32,
    ) -> Result<(), DomainError>;

    async fn save_session_snapshot(
        &self,
        id: SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), DomainError>;

    /// Every stored session, oldest first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, DomainError>;
}

/// Write a complete session state: ledger, every player's total, snapshot.
///
/// Used by both the periodic autosave and the final save.
pub async fn save_full<S: SessionStore + ?Sized>(
    store: &S,
    id: SessionId,
    players: &[Player],
    turns: &[Turn],
    snapshot: &SessionSnapshot,
) -> Result<(), DomainError> {
    store.replace_turns(id, turns).await?;
    for p in players {
        store.update_player_totals(id, p.id, p.total_vp).await?;
    }
    store.save_session_snapshot(id, snapshot).await
}

