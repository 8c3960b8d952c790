//! Property tests for rotation, VP bookkeeping and stats derivation.

use proptest::prelude::*;

use crate::config::session::SessionConfig;
use crate::domain::stats::recompute_stats;
use crate::domain::test_state_helpers::{make_session_with, T0};

fn config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(64)
        .max(1);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Threshold high enough that auto-pause never interferes.
fn no_pause() -> SessionConfig {
    SessionConfig::default().with_victory_threshold(u32::MAX)
}

proptest! {
    #![proptest_config(config())]

    /// Seat equals committed turns mod players; round equals turns / players.
    #[test]
    fn prop_rotation_tracks_turn_count(players in 1usize..=8, turns in 0usize..60) {
        let mut s = make_session_with(players, no_pause());
        s.toggle_run().unwrap();
        for _ in 0..turns {
            s.end_turn(T0).unwrap();
        }
        prop_assert_eq!(s.current_index(), turns % players);
        prop_assert_eq!(s.round() as usize, turns / players);
        prop_assert_eq!(s.ledger().len(), turns);
    }

    /// Totals never go negative, and each turn's delta list sums to the
    /// change actually applied to that player's total.
    #[test]
    fn prop_vp_floor_and_delta_sums(
        entries in proptest::collection::vec((-40i32..40, proptest::bool::ANY), 1..40),
    ) {
        let mut s = make_session_with(3, no_pause());
        s.toggle_run().unwrap();

        for (value, apply_now) in entries {
            let current = s.current_player().unwrap().id;
            let before = s.player(current).unwrap().total_vp;
            let mut applied_total: i64 = 0;

            s.set_pending_vp(current, value).unwrap();
            if apply_now {
                applied_total += i64::from(s.apply_pending_vp().unwrap());
                s.set_pending_vp(current, -value).unwrap();
            }
            let outcome = s.end_turn(T0).unwrap();

            let after = s.player(current).unwrap().total_vp;
            prop_assert!(outcome.turn.vp_deltas.iter().all(|d| *d != 0));
            prop_assert_eq!(outcome.turn.net_vp(), i64::from(after) - i64::from(before));
            let expected_first = (i64::from(before) + i64::from(value)).max(0);
            if apply_now {
                prop_assert_eq!(applied_total, expected_first - i64::from(before));
            } else {
                prop_assert_eq!(i64::from(after), expected_first);
            }
        }
    }

    /// Average is round(sum / n) and recomputing twice is stable.
    #[test]
    fn prop_average_is_rounded_mean(durations in proptest::collection::vec(0u32..600, 1..20)) {
        let mut s = make_session_with(1, no_pause());
        s.toggle_run().unwrap();
        for secs in &durations {
            for _ in 0..*secs {
                s.tick();
            }
            s.end_turn(T0).unwrap();
        }

        let sum: u64 = durations.iter().map(|d| u64::from(*d) * 1000).sum();
        let n = durations.len() as u64;
        let expected = (sum + n / 2) / n;

        let first = recompute_stats(s.ledger(), s.players());
        let second = recompute_stats(s.ledger(), s.players());
        prop_assert_eq!(first[0].average_turn_duration_ms, expected);
        prop_assert_eq!(first[0].share_percent, if sum == 0 { 0 } else { 100 });
        prop_assert_eq!(first, second);
    }
}
