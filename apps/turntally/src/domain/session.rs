//! The session state machine: whose turn it is, the clock, pending and
//! committed VP, and the ledger of completed turns.
//!
//! `GameSession` is a plain owned value. Every mutation is synchronous; the
//! async controller in `services::controller` serializes access and owns the
//! timers and the persistence calls.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::config::session::SessionConfig;
use crate::domain::clock::{Clock, ElapsedTimes};
use crate::domain::ledger::{Turn, TurnLedger};
use crate::domain::players::{Player, PlayerId};
use crate::domain::scoring::{commit_pending_vp, set_pending_vp, victory_reached};
use crate::domain::snapshot::{LoadedSession, SessionSnapshot};
use crate::domain::state::{next_seat, rounds_after_turns, seat_after_turns, SessionPhase};
use crate::domain::stats::{recompute_stats, PlayerStats};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

/// What a single `end_turn` changed, for callers that react to transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The ledger entry that was appended.
    pub turn: Turn,
    /// Player who acts next.
    pub next_player: PlayerId,
    /// The seat index wrapped back to 0.
    pub round_completed: bool,
    /// The victory threshold was reached and the clock was stopped.
    pub auto_paused: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    config: SessionConfig,
    players: Vec<Player>,
    current: usize,
    round: u32,
    clock: Clock,
    ledger: TurnLedger,
    phase: SessionPhase,
    /// Deltas already applied to the current player during the open turn.
    open_deltas: Vec<i32>,
    stats: Vec<PlayerStats>,
    stats_stale: bool,
}

impl GameSession {
    /// Fresh session, paused, first seat to act.
    pub fn new(players: Vec<Player>, config: SessionConfig) -> Result<Self, DomainError> {
        if players.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::NoPlayers,
                "A session needs at least one player",
            ));
        }
        let stats = recompute_stats(&TurnLedger::new(), &players);
        Ok(Self {
            clock: Clock::new(config.tick_quantum_ms),
            config,
            players,
            current: 0,
            round: 0,
            ledger: TurnLedger::new(),
            phase: SessionPhase::Active,
            open_deltas: Vec::new(),
            stats,
            stats_stale: false,
        })
    }

    /// Rebuild from stored state. Seat and round are derived from the ledger
    /// length, the clock resumes stopped, and a completed session comes back
    /// `Ended`.
    pub fn from_loaded(loaded: LoadedSession, config: SessionConfig) -> Result<Self, DomainError> {
        let LoadedSession {
            id,
            players,
            turns,
            snapshot,
        } = loaded;

        let mut session = Self::new(players, config)?;

        if let Some(orphan) = turns
            .iter()
            .find(|t| !session.players.iter().any(|p| p.id == t.player_id))
        {
            return Err(DomainError::persistence(
                InfraErrorKind::DataCorruption,
                format!(
                    "session {id} has a turn for unseated player {}",
                    orphan.player_id
                ),
            ));
        }

        let n = session.players.len();
        session.current = seat_after_turns(turns.len(), n);
        session.round = rounds_after_turns(turns.len(), n);
        session.ledger = TurnLedger::from_turns(turns);
        session.clock = Clock::restore(session.config.tick_quantum_ms, snapshot.elapsed);
        if snapshot.completed {
            session.phase = SessionPhase::Ended;
        }
        session.refresh_stats();

        debug!(
            session_id = id,
            turns = session.ledger.len(),
            current = session.current,
            round = session.round,
            "session restored"
        );
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn ledger(&self) -> &TurnLedger {
        &self.ledger
    }

    pub fn elapsed(&self) -> ElapsedTimes {
        self.clock.elapsed()
    }

    /// Deltas applied so far in the open turn.
    pub fn open_deltas(&self) -> &[i32] {
        &self.open_deltas
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            elapsed: self.clock.elapsed(),
            completed: self.phase == SessionPhase::Ended,
        }
    }

    fn require_active(&self) -> Result<(), DomainError> {
        match self.phase {
            SessionPhase::Active => Ok(()),
            SessionPhase::Ended => Err(DomainError::validation(
                ValidationKind::SessionEnded,
                "The game has already ended",
            )),
        }
    }

    /// One clock quantum: run counters when running, the total counter always.
    pub fn tick(&mut self) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        self.clock.tick();
        self.clock.tick_total();
    }

    /// Flip the run state and return the new one. Pausing recomputes stats.
    pub fn toggle_run(&mut self) -> Result<bool, DomainError> {
        self.require_active()?;
        if self.clock.is_running() {
            self.pause();
        } else {
            self.clock.start();
            debug!(current = self.current, "clock started");
        }
        Ok(self.clock.is_running())
    }

    /// Stop the clock (idempotent) and recompute stats.
    pub fn pause(&mut self) {
        self.clock.stop();
        self.refresh_stats();
    }

    /// Enter a pending delta for any seated player. Returns the clamped value.
    pub fn set_pending_vp(&mut self, player: PlayerId, value: i32) -> Result<i32, DomainError> {
        self.require_active()?;
        let policy = self.config.pending_vp;
        let p = self.player_mut(player)?;
        let stored = set_pending_vp(p, value, &policy);
        debug!(%player, value, stored, "pending VP set");
        self.check_victory();
        Ok(stored)
    }

    /// Commit the current player's pending VP now, recording it on the open turn.
    /// Returns the applied delta.
    pub fn apply_pending_vp(&mut self) -> Result<i32, DomainError> {
        self.require_active()?;
        let applied = self.commit_current()?;
        self.check_victory();
        Ok(applied)
    }

    /// Close the current player's turn.
    ///
    /// Order matters: pending VP is committed before the ledger entry is
    /// written so the entry carries the final delta list. Then the seat
    /// advances, the round counter moves on wrap, the turn clock resets and
    /// stats are marked stale.
    pub fn end_turn(&mut self, now: OffsetDateTime) -> Result<TurnOutcome, DomainError> {
        self.require_active()?;
        if !self.clock.is_running() {
            return Err(DomainError::validation(
                ValidationKind::NotRunning,
                "Start the clock before ending a turn",
            ));
        }

        // 1. commit pending VP into the open turn
        self.commit_current()?;
        let auto_paused = self.check_victory();

        // 2. ledger entry for the finished turn
        let player_id = self
            .current_player()
            .map(|p| p.id)
            .ok_or_else(|| self.missing_current_player())?;
        let turn = Turn::new(
            player_id,
            self.clock.turn_ms(),
            now,
            std::mem::take(&mut self.open_deltas),
        );
        self.ledger.append(turn.clone());

        // 3 + 4. rotate, counting a round on wrap
        self.current = next_seat(self.current, self.players.len());
        let round_completed = self.current == 0;
        if round_completed {
            self.round += 1;
        }

        // 5. fresh turn clock
        self.clock.reset_turn();

        // 6. stats catch up on next read, or now if we just paused
        self.stats_stale = true;
        if auto_paused {
            self.refresh_stats();
        }

        let next_player = self.players[self.current].id;
        info!(
            player = %player_id,
            turn_no = self.ledger.len(),
            duration_ms = turn.duration_ms,
            net_vp = turn.net_vp(),
            round = self.round,
            auto_paused,
            "turn ended"
        );

        Ok(TurnOutcome {
            turn,
            next_player,
            round_completed,
            auto_paused,
        })
    }

    /// Stats for every player, recomputed only if a turn was committed since
    /// the last computation.
    pub fn stats(&mut self) -> &[PlayerStats] {
        if self.stats_stale {
            self.refresh_stats();
        }
        &self.stats
    }

    /// Stats without touching the cache.
    pub fn stats_snapshot(&self) -> Vec<PlayerStats> {
        if self.stats_stale {
            recompute_stats(&self.ledger, &self.players)
        } else {
            self.stats.clone()
        }
    }

    pub fn stats_are_stale(&self) -> bool {
        self.stats_stale
    }

    /// Stop the clock and compute final stats ahead of the final save.
    pub fn prepare_end(&mut self) -> Result<(), DomainError> {
        self.require_active()?;
        self.pause();
        Ok(())
    }

    /// Flag the session as ended once its final state is durable.
    pub fn mark_ended(&mut self) {
        self.clock.stop();
        self.phase = SessionPhase::Ended;
        info!(turns = self.ledger.len(), round = self.round, "session ended");
    }

    /// Players holding the highest total. Ties return all of them.
    pub fn leaders(&self) -> Vec<PlayerId> {
        let best = self.players.iter().map(|p| p.total_vp).max().unwrap_or(0);
        self.players
            .iter()
            .filter(|p| p.total_vp == best)
            .map(|p| p.id)
            .collect()
    }

    fn refresh_stats(&mut self) {
        self.stats = recompute_stats(&self.ledger, &self.players);
        self.stats_stale = false;
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players.iter_mut().find(|p| p.id == id).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::UnknownPlayer,
                format!("Player {id} is not seated in this session"),
            )
        })
    }

    fn missing_current_player(&self) -> DomainError {
        error!(
            current = self.current,
            players = self.players.len(),
            "no player at current seat"
        );
        DomainError::invariant(format!(
            "current seat {} out of range for {} players",
            self.current,
            self.players.len()
        ))
    }

    /// Commit the current player's pending VP; non-zero applied deltas join
    /// the open turn.
    fn commit_current(&mut self) -> Result<i32, DomainError> {
        if self.current >= self.players.len() {
            return Err(self.missing_current_player());
        }
        let player = &mut self.players[self.current];
        if player.pending_vp == 0 {
            return Ok(0);
        }
        let applied = commit_pending_vp(player);
        if applied != 0 {
            self.open_deltas.push(applied);
        }
        Ok(applied)
    }

    /// Stop the clock when any total reached the victory threshold while
    /// running. Returns whether it did.
    fn check_victory(&mut self) -> bool {
        if self.clock.is_running() && victory_reached(&self.players, self.config.victory_threshold) {
            self.pause();
            info!(
                threshold = self.config.victory_threshold,
                "victory threshold reached; clock paused"
            );
            return true;
        }
        false
    }
}
