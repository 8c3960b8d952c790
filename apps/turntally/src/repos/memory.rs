//! In-process session store.
//!
//! Holds everything in a `parking_lot` mutex. Supports injecting write
//! failures so callers can exercise their retry paths.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use tracing::debug;

use super::SessionStore;
use crate::domain::ledger::Turn;
use crate::domain::players::{Player, PlayerId};
use crate::domain::snapshot::{LoadedSession, SessionId, SessionSnapshot, SessionSummary};
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

#[derive(Debug, Clone)]
struct StoredSession {
    players: Vec<Player>,
    turns: Vec<Turn>,
    snapshot: SessionSnapshot,
    created_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: SessionId,
    sessions: BTreeMap<SessionId, StoredSession>,
    fail_writes: usize,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` write operations fail with a retryable error.
    pub fn fail_next_saves(&self, n: usize) {
        self.inner.lock().fail_writes = n;
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    /// Direct read of a stored session, bypassing fault injection.
    pub fn peek(&self, id: SessionId) -> Option<LoadedSession> {
        let inner = self.inner.lock();
        inner.sessions.get(&id).map(|s| LoadedSession {
            id,
            players: s.players.clone(),
            turns: s.turns.clone(),
            snapshot: s.snapshot,
        })
    }
}

impl Inner {
    fn begin_write(&mut self, op: &'static str) -> Result<(), DomainError> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            debug!(op, "injected write failure");
            return Err(DomainError::persistence(
                InfraErrorKind::DbUnavailable,
                format!("{op}: store unavailable"),
            ));
        }
        self.writes += 1;
        Ok(())
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut StoredSession, DomainError> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Session, format!("Session {id} not found")))
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(&self, players: &[Player]) -> Result<SessionId, DomainError> {
        let mut inner = self.inner.lock();
        inner.begin_write("create_session")?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sessions.insert(
            id,
            StoredSession {
                players: players.to_vec(),
                turns: Vec::new(),
                snapshot: SessionSnapshot::default(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn load_session(&self, id: SessionId) -> Result<LoadedSession, DomainError> {
        self.peek(id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Session, format!("Session {id} not found")))
    }

    async fn append_turn(&self, id: SessionId, turn: &Turn) -> Result<(), DomainError> {
        let mut inner = self.inner.lock();
        inner.session_mut(id)?;
        inner.begin_write("append_turn")?;
        inner.session_mut(id)?.turns.push(turn.clone());
        Ok(())
    }

    async fn replace_turns(&self, id: SessionId, turns: &[Turn]) -> Result<(), DomainError> {
        let mut inner = self.inner.lock();
        inner.session_mut(id)?;
        inner.begin_write("replace_turns")?;
        inner.session_mut(id)?.turns = turns.to_vec();
        Ok(())
    }

    async fn update_player_totals(
        &self,
        id: SessionId,
        player_id: PlayerId,
        total_vp: u32,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock();
        inner.session_mut(id)?;
        inner.begin_write("update_player_totals")?;
        let player = inner
            .session_mut(id)?
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found"))
            })?;
        player.total_vp = total_vp;
        Ok(())
    }

    async fn save_session_snapshot(
        &self,
        id: SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.lock();
        inner.session_mut(id)?;
        inner.begin_write("save_session_snapshot")?;
        inner.session_mut(id)?.snapshot = *snapshot;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, DomainError> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .iter()
            .map(|(id, s)| SessionSummary {
                id: *id,
                completed: s.snapshot.completed,
                player_count: s.players.len(),
                turn_count: s.turns.len(),
                created_at: s.created_at,
            })
            .collect())
    }
}
