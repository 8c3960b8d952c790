//! Domain layer: pure session logic types and helpers.

pub mod aggregate;
pub mod clock;
pub mod ledger;
pub mod players;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stats;

#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_props_session;
#[cfg(test)]
mod tests_session;

// Re-exports for ergonomics
pub use clock::{Clock, ElapsedTimes};
pub use ledger::{Turn, TurnLedger};
pub use players::{GameSetup, Player, PlayerColor, PlayerId, PlayerSetup};
pub use session::{GameSession, TurnOutcome};
pub use snapshot::{LoadedSession, SessionId, SessionSnapshot, SessionSummary};
pub use state::SessionPhase;
pub use stats::{recompute_stats, PlayerStats};
