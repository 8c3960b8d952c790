//! Per-player turn statistics derived from the ledger.
//!
//! `recompute_stats` is pure: the same ledger and player list always give the
//! same result. Callers decide when to recompute; the session only does so on
//! turn commit (lazily), pause, and game end.

use serde::{Deserialize, Serialize};

use crate::domain::ledger::TurnLedger;
use crate::domain::players::{Player, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub turn_count: u32,
    pub total_duration_ms: u64,
    /// Duration of the player's most recent turn; 0 before their first turn.
    pub last_turn_duration_ms: u64,
    pub average_turn_duration_ms: u64,
    /// Share of all recorded turn time, rounded to a whole percent.
    pub share_percent: u32,
}

/// `round(numerator / denominator)` with halves rounded up. Zero denominator yields zero.
fn rounded_div(numerator: u128, denominator: u128) -> u64 {
    if denominator == 0 {
        return 0;
    }
    ((numerator + denominator / 2) / denominator) as u64
}

/// Compute stats for every player, in seat order.
pub fn recompute_stats(ledger: &TurnLedger, players: &[Player]) -> Vec<PlayerStats> {
    let mut stats: Vec<PlayerStats> = players
        .iter()
        .map(|p| PlayerStats {
            player_id: p.id,
            turn_count: 0,
            total_duration_ms: 0,
            last_turn_duration_ms: 0,
            average_turn_duration_ms: 0,
            share_percent: 0,
        })
        .collect();

    for turn in ledger.all() {
        // Turns for players no longer seated are ignored
        if let Some(s) = stats.iter_mut().find(|s| s.player_id == turn.player_id) {
            s.turn_count += 1;
            s.total_duration_ms = s.total_duration_ms.saturating_add(turn.duration_ms);
            s.last_turn_duration_ms = turn.duration_ms;
        }
    }

    let grand_total: u128 = stats.iter().map(|s| u128::from(s.total_duration_ms)).sum();
    for s in &mut stats {
        s.average_turn_duration_ms =
            rounded_div(u128::from(s.total_duration_ms), u128::from(s.turn_count));
        s.share_percent =
            rounded_div(u128::from(s.total_duration_ms) * 100, grand_total) as u32;
    }

    stats
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::ledger::Turn;

    fn player(name: &str) -> Player {
        Player {
            id: PlayerId::new(),
            name: name.into(),
            side: None,
            color: None,
            background_image: None,
            total_vp: 0,
            pending_vp: 0,
        }
    }

    fn ledger_of(entries: &[(PlayerId, u64)]) -> TurnLedger {
        let at = datetime!(2026-03-01 20:00 UTC);
        TurnLedger::from_turns(
            entries
                .iter()
                .map(|(id, ms)| Turn::new(*id, *ms, at, vec![]))
                .collect(),
        )
    }

    #[test]
    fn empty_ledger_gives_zeroed_stats() {
        let players = vec![player("A"), player("B")];
        let stats = recompute_stats(&TurnLedger::new(), &players);
        assert_eq!(stats.len(), 2);
        assert!(stats
            .iter()
            .all(|s| s.turn_count == 0 && s.share_percent == 0 && s.average_turn_duration_ms == 0));
    }

    #[test]
    fn average_last_and_share() {
        let players = vec![player("A"), player("B")];
        let (a, b) = (players[0].id, players[1].id);
        let ledger = ledger_of(&[(a, 10_000), (b, 20_000), (a, 5_001)]);

        let stats = recompute_stats(&ledger, &players);
        assert_eq!(stats[0].turn_count, 2);
        assert_eq!(stats[0].total_duration_ms, 15_001);
        assert_eq!(stats[0].last_turn_duration_ms, 5_001);
        // 15001 / 2 = 7500.5 -> 7501
        assert_eq!(stats[0].average_turn_duration_ms, 7_501);
        assert_eq!(stats[1].average_turn_duration_ms, 20_000);
        // 15001 / 35001 = 42.86% -> 43, 20000 / 35001 = 57.14% -> 57
        assert_eq!(stats[0].share_percent, 43);
        assert_eq!(stats[1].share_percent, 57);
    }

    #[test]
    fn recompute_is_idempotent() {
        let players = vec![player("A"), player("B"), player("C")];
        let ledger = ledger_of(&[
            (players[0].id, 1_000),
            (players[1].id, 2_000),
            (players[2].id, 3_000),
        ]);
        let first = recompute_stats(&ledger, &players);
        let second = recompute_stats(&ledger, &players);
        assert_eq!(first, second);
    }
}
