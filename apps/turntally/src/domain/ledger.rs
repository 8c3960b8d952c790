use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::players::PlayerId;

/// A completed turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player_id: PlayerId,
    /// Turn clock at the moment the turn was ended.
    pub duration_ms: u64,
    pub played_at: OffsetDateTime,
    /// VP changes applied during the turn, in order. Zero entries are never stored.
    pub vp_deltas: Vec<i32>,
}

impl Turn {
    pub fn new(
        player_id: PlayerId,
        duration_ms: u64,
        played_at: OffsetDateTime,
        vp_deltas: Vec<i32>,
    ) -> Self {
        Self {
            player_id,
            duration_ms,
            played_at,
            vp_deltas: vp_deltas.into_iter().filter(|d| *d != 0).collect(),
        }
    }

    /// Net VP change of the turn.
    pub fn net_vp(&self) -> i64 {
        self.vp_deltas.iter().map(|d| i64::from(*d)).sum()
    }
}

/// Append-only record of completed turns.
///
/// Corrections happen by replacing the whole ledger from storage, never by
/// editing entries in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLedger {
    turns: Vec<Turn>,
}

impl TurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a stored sequence.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Turns belonging to one player, oldest first.
    pub fn for_player(&self, player_id: PlayerId) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(move |t| t.player_id == player_id)
    }
}
