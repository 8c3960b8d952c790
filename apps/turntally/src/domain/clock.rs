//! Game clock: turn and game counters that only advance while running, and a
//! total counter that always advances so paused time is still reported.
//!
//! All counters are milliseconds and only ever move by whole quanta.

use serde::{Deserialize, Serialize};

/// The three counters at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElapsedTimes {
    pub turn_ms: u64,
    pub game_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    running: bool,
    quantum_ms: u64,
    elapsed: ElapsedTimes,
}

impl Clock {
    pub fn new(quantum_ms: u64) -> Self {
        Self::restore(quantum_ms, ElapsedTimes::default())
    }

    /// Resume from persisted counters; a restored clock is always stopped.
    pub fn restore(quantum_ms: u64, elapsed: ElapsedTimes) -> Self {
        Self {
            running: false,
            quantum_ms,
            elapsed,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One quantum of run time. No-op while stopped.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed.turn_ms = self.elapsed.turn_ms.saturating_add(self.quantum_ms);
            self.elapsed.game_ms = self.elapsed.game_ms.saturating_add(self.quantum_ms);
        }
    }

    /// One quantum of wall time, regardless of run state.
    pub fn tick_total(&mut self) {
        self.elapsed.total_ms = self.elapsed.total_ms.saturating_add(self.quantum_ms);
    }

    pub fn reset_turn(&mut self) {
        self.elapsed.turn_ms = 0;
    }

    pub fn turn_ms(&self) -> u64 {
        self.elapsed.turn_ms
    }

    pub fn elapsed(&self) -> ElapsedTimes {
        self.elapsed
    }

    pub fn quantum_ms(&self) -> u64 {
        self.quantum_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_only_counts_while_running() {
        let mut clock = Clock::new(1000);
        clock.tick();
        assert_eq!(clock.elapsed(), ElapsedTimes::default());

        clock.start();
        clock.tick();
        clock.tick();
        assert_eq!(clock.turn_ms(), 2000);
        assert_eq!(clock.elapsed().game_ms, 2000);

        clock.stop();
        clock.tick();
        assert_eq!(clock.elapsed().game_ms, 2000);
    }

    #[test]
    fn total_advances_regardless_of_run_state() {
        let mut clock = Clock::new(1000);
        clock.tick_total();
        clock.start();
        clock.tick_total();
        assert_eq!(clock.elapsed().total_ms, 2000);
        assert_eq!(clock.elapsed().game_ms, 0);
    }

    #[test]
    fn reset_turn_keeps_game_time() {
        let mut clock = Clock::new(1000);
        clock.start();
        clock.tick();
        clock.reset_turn();
        assert_eq!(clock.turn_ms(), 0);
        assert_eq!(clock.elapsed().game_ms, 1000);
    }

    #[test]
    fn restore_is_stopped() {
        let clock = Clock::restore(
            1000,
            ElapsedTimes {
                turn_ms: 3000,
                game_ms: 9000,
                total_ms: 12000,
            },
        );
        assert!(!clock.is_running());
        assert_eq!(clock.turn_ms(), 3000);
    }
}
