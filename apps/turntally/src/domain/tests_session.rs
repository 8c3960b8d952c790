use crate::config::session::{SessionConfig, VpClampPolicy};
use crate::domain::clock::ElapsedTimes;
use crate::domain::ledger::Turn;
use crate::domain::players::PlayerId;
use crate::domain::session::GameSession;
use crate::domain::snapshot::{LoadedSession, SessionSnapshot};
use crate::domain::state::SessionPhase;
use crate::domain::test_state_helpers::{make_session, make_session_with, play_turn, T0};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

#[test]
fn two_players_first_turn_with_vp() {
    // P1 ends turn with pending VP = 5 and duration 10000ms
    let mut s = make_session(2);
    let p1 = s.players()[0].id;
    s.toggle_run().unwrap();
    for _ in 0..10 {
        s.tick();
    }
    s.set_pending_vp(p1, 5).unwrap();
    let outcome = s.end_turn(T0).unwrap();

    assert_eq!(s.ledger().len(), 1);
    let entry = &s.ledger().all()[0];
    assert_eq!(entry.player_id, p1);
    assert_eq!(entry.duration_ms, 10_000);
    assert_eq!(entry.vp_deltas, vec![5]);
    assert_eq!(s.player(p1).unwrap().total_vp, 5);
    assert_eq!(s.player(p1).unwrap().pending_vp, 0);
    assert_eq!(s.current_index(), 1);
    assert_eq!(outcome.next_player, s.players()[1].id);
    assert!(!outcome.round_completed);
    assert_eq!(s.elapsed().turn_ms, 0);
    assert_eq!(s.elapsed().game_ms, 10_000);
}

#[test]
fn negative_pending_clamps_total_at_zero() {
    let mut s = make_session(2);
    let p1 = s.players()[0].id;
    s.toggle_run().unwrap();
    s.set_pending_vp(p1, 2).unwrap();
    s.apply_pending_vp().unwrap();
    s.set_pending_vp(p1, -5).unwrap();
    let outcome = s.end_turn(T0).unwrap();

    assert_eq!(s.player(p1).unwrap().total_vp, 0);
    // the ledger records what was actually applied
    assert_eq!(outcome.turn.vp_deltas, vec![2, -2]);
    assert_eq!(outcome.turn.net_vp(), 0);
}

#[test]
fn three_players_seven_turns() {
    let mut s = make_session(3);
    for _ in 0..7 {
        play_turn(&mut s, 1);
    }
    assert_eq!(s.round(), 2);
    assert_eq!(s.current_index(), 1);
}

#[test]
fn round_completes_on_wrap() {
    let mut s = make_session(2);
    s.toggle_run().unwrap();
    assert!(!s.end_turn(T0).unwrap().round_completed);
    assert!(s.end_turn(T0).unwrap().round_completed);
    assert_eq!(s.round(), 1);
}

#[test]
fn victory_threshold_pauses_clock() {
    let mut s = make_session_with(2, SessionConfig::default().with_victory_threshold(30));
    let p2 = s.players()[1].id;
    play_turn(&mut s, 3); // P1's turn
    assert!(s.is_running());

    s.set_pending_vp(p2, 30).unwrap();
    assert!(s.is_running(), "pending VP alone does not reach the threshold");
    let outcome = s.end_turn(T0).unwrap();

    assert!(outcome.auto_paused);
    assert!(!s.is_running());
    assert_eq!(s.player(p2).unwrap().total_vp, 30);
    // the turn still completed
    assert_eq!(s.ledger().len(), 2);
    assert_eq!(s.current_index(), 0);
    assert!(!s.stats_are_stale());
}

#[test]
fn apply_pending_mid_turn_can_trigger_pause() {
    let mut s = make_session_with(2, SessionConfig::default().with_victory_threshold(10));
    let p1 = s.players()[0].id;
    s.toggle_run().unwrap();
    s.set_pending_vp(p1, 12).unwrap();
    assert_eq!(s.apply_pending_vp().unwrap(), 12);
    assert!(!s.is_running());
    assert_eq!(s.open_deltas(), &[12]);
}

#[test]
fn end_turn_requires_running_clock() {
    let mut s = make_session(2);
    let err = s.end_turn(T0).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NotRunning, _)
    ));
    assert!(s.ledger().is_empty());
}

#[test]
fn pending_for_other_player_waits_for_their_turn() {
    let mut s = make_session(2);
    let p2 = s.players()[1].id;
    s.toggle_run().unwrap();
    s.set_pending_vp(p2, 4).unwrap();
    s.end_turn(T0).unwrap(); // P1's turn closes
    assert_eq!(s.player(p2).unwrap().total_vp, 0);
    assert_eq!(s.player(p2).unwrap().pending_vp, 4);
    s.end_turn(T0).unwrap(); // P2's turn closes
    assert_eq!(s.player(p2).unwrap().total_vp, 4);
    assert_eq!(s.ledger().all()[1].vp_deltas, vec![4]);
}

#[test]
fn pending_entries_are_clamped_not_rejected() {
    let config =
        SessionConfig::default().with_pending_vp(VpClampPolicy::Range { min: 0, max: 50 });
    let mut s = make_session_with(1, config);
    let p1 = s.players()[0].id;
    assert_eq!(s.set_pending_vp(p1, 80).unwrap(), 50);
    assert_eq!(s.set_pending_vp(p1, -7).unwrap(), 0);
}

#[test]
fn unknown_player_is_a_validation_error() {
    let mut s = make_session(2);
    let err = s.set_pending_vp(PlayerId::new(), 3).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::UnknownPlayer, _)
    ));
}

#[test]
fn stats_are_batched_until_read_or_pause() {
    let mut s = make_session(2);
    play_turn(&mut s, 4);
    assert!(s.stats_are_stale());
    assert_eq!(s.stats()[0].last_turn_duration_ms, 4_000);
    assert!(!s.stats_are_stale());

    play_turn(&mut s, 6);
    assert!(s.stats_are_stale());
    s.toggle_run().unwrap(); // pause
    assert!(!s.stats_are_stale());
    assert_eq!(s.stats_snapshot()[1].share_percent, 60);
}

#[test]
fn ticks_while_paused_only_count_total() {
    let mut s = make_session(2);
    s.tick();
    s.tick();
    assert_eq!(
        s.elapsed(),
        ElapsedTimes {
            turn_ms: 0,
            game_ms: 0,
            total_ms: 2_000
        }
    );
}

#[test]
fn ended_session_rejects_mutation() {
    let mut s = make_session(2);
    play_turn(&mut s, 1);
    s.prepare_end().unwrap();
    s.mark_ended();

    assert_eq!(s.phase(), SessionPhase::Ended);
    assert!(s.snapshot().completed);
    assert!(matches!(
        s.toggle_run().unwrap_err(),
        DomainError::Validation(ValidationKind::SessionEnded, _)
    ));
    let before = s.elapsed();
    s.tick();
    assert_eq!(s.elapsed(), before);
}

#[test]
fn from_loaded_derives_seat_and_round_from_ledger() {
    let live = {
        let mut s = make_session(3);
        for _ in 0..4 {
            play_turn(&mut s, 2);
        }
        s
    };

    let loaded = LoadedSession {
        id: 9,
        players: live.players().to_vec(),
        turns: live.ledger().all().to_vec(),
        snapshot: SessionSnapshot {
            elapsed: live.elapsed(),
            completed: false,
        },
    };
    let restored = GameSession::from_loaded(loaded, SessionConfig::default()).unwrap();

    assert_eq!(restored.current_index(), 1);
    assert_eq!(restored.round(), 1);
    assert!(!restored.is_running());
    assert_eq!(restored.elapsed(), live.elapsed());
    assert_eq!(restored.ledger(), live.ledger());
    assert_eq!(restored.phase(), SessionPhase::Active);
}

#[test]
fn from_loaded_without_players_fails() {
    let loaded = LoadedSession {
        id: 1,
        players: vec![],
        turns: vec![],
        snapshot: SessionSnapshot::default(),
    };
    let err = GameSession::from_loaded(loaded, SessionConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NoPlayers, _)
    ));
}

#[test]
fn from_loaded_rejects_turns_for_strangers() {
    let s = make_session(2);
    let loaded = LoadedSession {
        id: 3,
        players: s.players().to_vec(),
        turns: vec![Turn::new(PlayerId::new(), 1_000, T0, vec![])],
        snapshot: SessionSnapshot::default(),
    };
    let err = GameSession::from_loaded(loaded, SessionConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Persistence(InfraErrorKind::DataCorruption, _)
    ));
}

#[test]
fn completed_snapshot_restores_ended() {
    let s = make_session(2);
    let loaded = LoadedSession {
        id: 4,
        players: s.players().to_vec(),
        turns: vec![],
        snapshot: SessionSnapshot {
            elapsed: ElapsedTimes::default(),
            completed: true,
        },
    };
    let restored = GameSession::from_loaded(loaded, SessionConfig::default()).unwrap();
    assert_eq!(restored.phase(), SessionPhase::Ended);
}

#[test]
fn leaders_include_ties() {
    let mut s = make_session(3);
    let (a, b) = (s.players()[0].id, s.players()[1].id);
    s.toggle_run().unwrap();
    s.set_pending_vp(a, 7).unwrap();
    s.end_turn(T0).unwrap();
    s.set_pending_vp(b, 7).unwrap();
    s.end_turn(T0).unwrap();
    assert_eq!(s.leaders(), vec![a, b]);
}

#[test]
fn session_serializes_and_restores() {
    let mut s = make_session(2);
    play_turn(&mut s, 3);
    let json = serde_json::to_string(&s).unwrap();
    let back: GameSession = serde_json::from_str(&json).unwrap();
    assert_eq!(back.ledger(), s.ledger());
    assert_eq!(back.current_index(), s.current_index());
    assert_eq!(back.elapsed(), s.elapsed());
}
