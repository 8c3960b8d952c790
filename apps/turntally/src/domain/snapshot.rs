//! Shapes exchanged with the persistence gateway.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::clock::ElapsedTimes;
use crate::domain::ledger::{Turn, TurnLedger};
use crate::domain::players::Player;
use crate::domain::stats::{recompute_stats, PlayerStats};

/// Durable identifier handed out by the store.
pub type SessionId = i64;

/// Periodic and final session state that is not captured by players or turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub elapsed: ElapsedTimes,
    pub completed: bool,
}

/// Everything needed to resume a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedSession {
    pub id: SessionId,
    /// Seat order.
    pub players: Vec<Player>,
    /// Ledger order.
    pub turns: Vec<Turn>,
    pub snapshot: SessionSnapshot,
}

impl LoadedSession {
    /// Stats are derived from the ledger rather than stored.
    pub fn stats(&self) -> Vec<PlayerStats> {
        recompute_stats(&TurnLedger::from_turns(self.turns.clone()), &self.players)
    }
}

/// Listing entry for browsing stored sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub completed: bool,
    pub player_count: usize,
    pub turn_count: usize,
    pub created_at: OffsetDateTime,
}
