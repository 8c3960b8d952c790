//! Seat rotation math shared by the session, the store loader and the tests.
//!
//! Rotation order is seat order. A round is one full pass over every seat, so
//! both the current seat and the round counter are pure functions of how many
//! turns have been committed.

use serde::{Deserialize, Serialize};

/// Lifecycle of a loaded session. "Idle" (nothing loaded) lives in the
/// controller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Turns may be played; the clock may or may not be running.
    Active,
    /// Final state was persisted; no further mutation.
    Ended,
}

/// Returns the seat after `index`, wrapping to 0.
#[inline]
pub fn next_seat(index: usize, player_count: usize) -> usize {
    debug_assert!(player_count > 0, "rotation needs at least one seat");
    (index + 1) % player_count
}

/// Seat to act after `turns` committed turns.
#[inline]
pub fn seat_after_turns(turns: usize, player_count: usize) -> usize {
    debug_assert!(player_count > 0, "rotation needs at least one seat");
    turns % player_count
}

/// Completed rounds after `turns` committed turns.
#[inline]
pub fn rounds_after_turns(turns: usize, player_count: usize) -> u32 {
    debug_assert!(player_count > 0, "rotation needs at least one seat");
    (turns / player_count) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_seat_wraps() {
        assert_eq!(next_seat(0, 3), 1);
        assert_eq!(next_seat(2, 3), 0);
        assert_eq!(next_seat(0, 1), 0);
    }

    #[test]
    fn seven_turns_three_players() {
        assert_eq!(seat_after_turns(7, 3), 1);
        assert_eq!(rounds_after_turns(7, 3), 2);
    }
}
