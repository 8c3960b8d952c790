use time::macros::datetime;
use time::OffsetDateTime;

use crate::config::session::SessionConfig;
use crate::domain::players::{GameSetup, PlayerSetup};
use crate::domain::session::GameSession;

pub const T0: OffsetDateTime = datetime!(2026-10-19 18:00 UTC);

/// Session with `n` players named P1..Pn, default config.
pub fn make_session(n: usize) -> GameSession {
    make_session_with(n, SessionConfig::default())
}

pub fn make_session_with(n: usize, config: SessionConfig) -> GameSession {
    let setup = GameSetup::new((1..=n).map(|i| PlayerSetup::named(format!("P{i}"))).collect());
    let players = setup.into_players().expect("valid setup");
    GameSession::new(players, config).expect("non-empty players")
}

/// Start the clock, let `seconds` ticks pass, and end the turn.
pub fn play_turn(session: &mut GameSession, seconds: u32) {
    if !session.is_running() {
        session.toggle_run().expect("toggle");
    }
    for _ in 0..seconds {
        session.tick();
    }
    session.end_turn(T0).expect("end turn");
}
