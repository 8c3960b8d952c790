//! Cross-session statistics, grouped by player display name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::LoadedSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAggregate {
    pub name: String,
    pub games_played: u32,
    /// Completed games in which the player held (or shared) the top total.
    pub games_won: u32,
    pub total_vp: u64,
    pub turn_count: u32,
    pub total_turn_ms: u64,
    pub average_turn_ms: u64,
}

/// Aggregate every player across the given sessions.
///
/// Names are matched case-insensitively; the first spelling seen is kept.
/// Sorted by wins (descending), then name.
pub fn aggregate_players(sessions: &[LoadedSession]) -> Vec<PlayerAggregate> {
    let mut by_name: BTreeMap<String, PlayerAggregate> = BTreeMap::new();

    for session in sessions {
        let best = session.players.iter().map(|p| p.total_vp).max().unwrap_or(0);

        for player in &session.players {
            let entry = by_name
                .entry(player.name.to_lowercase())
                .or_insert_with(|| PlayerAggregate {
                    name: player.name.clone(),
                    games_played: 0,
                    games_won: 0,
                    total_vp: 0,
                    turn_count: 0,
                    total_turn_ms: 0,
                    average_turn_ms: 0,
                });

            entry.games_played += 1;
            if session.snapshot.completed && player.total_vp == best {
                entry.games_won += 1;
            }
            entry.total_vp += u64::from(player.total_vp);

            for turn in session.turns.iter().filter(|t| t.player_id == player.id) {
                entry.turn_count += 1;
                entry.total_turn_ms = entry.total_turn_ms.saturating_add(turn.duration_ms);
            }
        }
    }

    let mut out: Vec<PlayerAggregate> = by_name
        .into_values()
        .map(|mut a| {
            if a.turn_count > 0 {
                let n = u64::from(a.turn_count);
                a.average_turn_ms = (a.total_turn_ms + n / 2) / n;
            }
            a
        })
        .collect();
    out.sort_by(|a, b| b.games_won.cmp(&a.games_won).then_with(|| a.name.cmp(&b.name)));
    out
}
