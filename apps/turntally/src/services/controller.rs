//! Async shell around [`GameSession`].
//!
//! The controller owns the session behind a mutex, runs the clock ticker and
//! the autosave loop on tokio, and performs every store call. Mutations are
//! synchronous and never hold the lock across an await point, so a slow save
//! cannot stall the tick cadence.
//!
//! Full saves pass through a [`SaveGate`]: a save captured earlier never lands
//! on top of one captured later, and the final save waits for any autosave
//! still in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::session::SessionConfig;
use crate::domain::clock::ElapsedTimes;
use crate::domain::ledger::Turn;
use crate::domain::players::{GameSetup, Player, PlayerId};
use crate::domain::session::{GameSession, TurnOutcome};
use crate::domain::snapshot::{SessionId, SessionSnapshot};
use crate::domain::state::SessionPhase;
use crate::domain::stats::PlayerStats;
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::{save_full, SessionStore};
use crate::services::setup_store::SetupStore;

#[derive(Debug, Clone)]
pub enum ControllerState {
    Idle,
    Active { id: SessionId, session: GameSession },
    /// Final save in flight; the session is paused and frozen.
    Ending { id: SessionId, session: GameSession },
    Ended { id: SessionId, session: GameSession },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    Idle,
    Active,
    Ending,
    Ended,
}

/// Cheap read model for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerStatus {
    pub phase: ControllerPhase,
    pub session_id: Option<SessionId>,
    pub running: bool,
    pub current_player: Option<PlayerId>,
    pub round: u32,
    pub elapsed: ElapsedTimes,
}

/// Everything one full save writes, copied out from under the lock.
#[derive(Debug, Clone)]
struct SaveJob {
    seq: u64,
    id: SessionId,
    players: Vec<Player>,
    turns: Vec<Turn>,
    snapshot: SessionSnapshot,
}

impl SaveJob {
    /// Must be called with the state lock held so sequence numbers follow
    /// the order in which states were observed.
    fn capture(gate: &SaveGate, id: SessionId, session: &GameSession) -> Self {
        Self {
            seq: gate.issue(),
            id,
            players: session.players().to_vec(),
            turns: session.ledger().all().to_vec(),
            snapshot: session.snapshot(),
        }
    }
}

/// Serialises full saves and drops the ones overtaken by a newer capture.
#[derive(Debug, Default)]
struct SaveGate {
    issued: AtomicU64,
    written: tokio::sync::Mutex<u64>,
}

impl SaveGate {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns `false` when a newer capture was already written and this job
    /// was skipped.
    async fn write<S: SessionStore + ?Sized>(
        &self,
        job: &SaveJob,
        store: &S,
    ) -> Result<bool, DomainError> {
        let mut written = self.written.lock().await;
        if job.seq <= *written {
            debug!(session_id = job.id, seq = job.seq, latest = *written, "stale save skipped");
            return Ok(false);
        }
        save_full(store, job.id, &job.players, &job.turns, &job.snapshot).await?;
        *written = job.seq;
        Ok(true)
    }
}

fn no_active_session() -> DomainError {
    DomainError::validation(ValidationKind::NoActiveSession, "No session is active")
}

fn session_ended() -> DomainError {
    DomainError::validation(ValidationKind::SessionEnded, "The game has already ended")
}

fn session_ending() -> DomainError {
    DomainError::validation(ValidationKind::SessionEnding, "The game is being ended")
}

/// Why a state other than `Active` refuses a mutation.
fn not_active(state: &ControllerState) -> DomainError {
    match state {
        ControllerState::Idle => no_active_session(),
        ControllerState::Ending { .. } => session_ending(),
        ControllerState::Ended { .. } => session_ended(),
        ControllerState::Active { id, .. } => {
            DomainError::invariant(format!("session {id} is active"))
        }
    }
}

pub struct SessionController<S: SessionStore> {
    store: Arc<S>,
    config: SessionConfig,
    state: Arc<Mutex<ControllerState>>,
    saves: Arc<SaveGate>,
    timers: Mutex<Option<CancellationToken>>,
}

impl<S: SessionStore> SessionController<S> {
    pub fn new(store: Arc<S>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            state: Arc::new(Mutex::new(ControllerState::Idle)),
            saves: Arc::new(SaveGate::default()),
            timers: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_idle(&self) -> Result<(), DomainError> {
        match &*self.state.lock() {
            ControllerState::Idle => Ok(()),
            ControllerState::Active { id, .. }
            | ControllerState::Ending { id, .. }
            | ControllerState::Ended { id, .. } => Err(DomainError::validation(
                ValidationKind::SessionAlreadyActive,
                format!("Session {id} is still loaded; reset it first"),
            )),
        }
    }

    /// Move from `Idle` into `next`, starting timers for an active session.
    fn install(&self, next: ControllerState) -> Result<(), AppError> {
        {
            let mut state = self.state.lock();
            if !matches!(*state, ControllerState::Idle) {
                return Err(DomainError::validation(
                    ValidationKind::SessionAlreadyActive,
                    "Another session was loaded concurrently",
                )
                .into());
            }
            *state = next;
        }
        if matches!(*self.state.lock(), ControllerState::Active { .. }) {
            self.spawn_timers();
        }
        Ok(())
    }

    fn with_active<T>(
        &self,
        f: impl FnOnce(&mut GameSession) -> Result<T, DomainError>,
    ) -> Result<T, AppError> {
        let mut state = self.state.lock();
        match &mut *state {
            ControllerState::Active { session, .. } => f(session).map_err(AppError::from),
            other => Err(not_active(other).into()),
        }
    }

    /// Validate the setup, create the session in the store and make it active.
    /// The clock starts paused.
    pub async fn start_new(&self, setup: GameSetup) -> Result<SessionId, AppError> {
        self.ensure_idle()?;
        let players = setup.into_players()?;
        let session = GameSession::new(players, self.config.clone())?;

        let id = self.store.create_session(session.players()).await?;
        self.install(ControllerState::Active { id, session })?;
        info!(session_id = id, "session started");
        Ok(id)
    }

    /// Start from a setup saved under `key`. A missing setup leaves the
    /// controller `Idle`.
    pub async fn start_from_setup(
        &self,
        setups: &SetupStore,
        key: &str,
    ) -> Result<SessionId, AppError> {
        let setup = setups.load(key).await?.ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NoPlayers,
                format!("No player list saved under '{key}'"),
            )
        })?;
        self.start_new(setup).await
    }

    /// Resume a stored session. Completed sessions come back `Ended`.
    pub async fn load(&self, id: SessionId) -> Result<SessionPhase, AppError> {
        self.ensure_idle()?;
        let loaded = self.store.load_session(id).await?;
        let session = GameSession::from_loaded(loaded, self.config.clone())?;
        let phase = session.phase();

        let next = match phase {
            SessionPhase::Active => ControllerState::Active { id, session },
            SessionPhase::Ended => ControllerState::Ended { id, session },
        };
        self.install(next)?;
        info!(session_id = id, ?phase, "session loaded");
        Ok(phase)
    }

    /// Returns the new run state.
    pub fn toggle_run(&self) -> Result<bool, AppError> {
        self.with_active(GameSession::toggle_run)
    }

    pub fn set_pending_vp(&self, player: PlayerId, value: i32) -> Result<i32, AppError> {
        self.with_active(|s| s.set_pending_vp(player, value))
    }

    pub fn apply_pending_vp(&self) -> Result<i32, AppError> {
        self.with_active(GameSession::apply_pending_vp)
    }

    pub fn end_turn(&self) -> Result<TurnOutcome, AppError> {
        self.with_active(|s| s.end_turn(OffsetDateTime::now_utc()))
    }

    /// One clock quantum. The ticker calls this; exposed for manual drivers.
    pub fn tick(&self) {
        if let ControllerState::Active { session, .. } = &mut *self.state.lock() {
            session.tick();
        }
    }

    /// Pause, compute final stats and write the final state.
    ///
    /// While the write is in flight the controller is `Ending` and rejects
    /// mutations. On success the session is `Ended` and its timers stop. On
    /// failure it returns to active and paused, and the error says whether a
    /// retry may help.
    pub async fn end_game(&self) -> Result<(), AppError> {
        let job = {
            let mut state = self.state.lock();
            let (id, mut session) = match std::mem::replace(&mut *state, ControllerState::Idle) {
                ControllerState::Active { id, session } => (id, session),
                other => {
                    let err = not_active(&other);
                    *state = other;
                    return Err(err.into());
                }
            };
            if let Err(e) = session.prepare_end() {
                *state = ControllerState::Active { id, session };
                return Err(e.into());
            }
            let mut job = SaveJob::capture(&self.saves, id, &session);
            job.snapshot.completed = true;
            *state = ControllerState::Ending { id, session };
            job
        };

        let result = self.saves.write(&job, &*self.store).await;

        // A reset while the save was in flight leaves the new state alone.
        let ended = {
            let mut state = self.state.lock();
            let current = std::mem::replace(&mut *state, ControllerState::Idle);
            let (next, ended) = match (current, &result) {
                (ControllerState::Ending { id, mut session }, Ok(_)) if id == job.id => {
                    session.mark_ended();
                    (ControllerState::Ended { id, session }, true)
                }
                (ControllerState::Ending { id, session }, Err(_)) if id == job.id => {
                    (ControllerState::Active { id, session }, false)
                }
                (other, _) => (other, false),
            };
            *state = next;
            ended
        };

        if let Err(e) = result {
            warn!(session_id = job.id, error = %e, "final save failed; session left paused");
            return Err(e.into());
        }
        if ended {
            self.cancel_timers();
        }
        info!(session_id = job.id, turns = job.turns.len(), "game ended");
        Ok(())
    }

    /// Write the current state now. An ended session is already durable.
    pub async fn save_now(&self) -> Result<(), AppError> {
        let job = match &*self.state.lock() {
            ControllerState::Active { id, session } => SaveJob::capture(&self.saves, *id, session),
            ControllerState::Ended { .. } => return Ok(()),
            other => return Err(not_active(other).into()),
        };
        self.saves.write(&job, &*self.store).await?;
        debug!(session_id = job.id, "session saved");
        Ok(())
    }

    /// Drop the loaded session and return to `Idle`.
    ///
    /// With `persist_first`, an active session is saved before it is
    /// discarded; if that save fails nothing is reset.
    pub async fn reset_session(&self, persist_first: bool) -> Result<(), AppError> {
        let active = matches!(*self.state.lock(), ControllerState::Active { .. });
        if persist_first && active {
            self.save_now().await?;
        }

        self.cancel_timers();
        let previous = std::mem::replace(&mut *self.state.lock(), ControllerState::Idle);
        if let ControllerState::Active { id, .. }
        | ControllerState::Ending { id, .. }
        | ControllerState::Ended { id, .. } = previous
        {
            info!(session_id = id, persisted = persist_first, "session reset");
        }
        Ok(())
    }

    /// Clone of the loaded session for reads.
    pub fn session(&self) -> Option<GameSession> {
        match &*self.state.lock() {
            ControllerState::Active { session, .. }
            | ControllerState::Ending { session, .. }
            | ControllerState::Ended { session, .. } => Some(session.clone()),
            ControllerState::Idle => None,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        match &*self.state.lock() {
            ControllerState::Active { id, .. }
            | ControllerState::Ending { id, .. }
            | ControllerState::Ended { id, .. } => Some(*id),
            ControllerState::Idle => None,
        }
    }

    /// Current stats, recomputed first if a turn was committed since the
    /// last computation.
    pub fn stats(&self) -> Result<Vec<PlayerStats>, AppError> {
        match &mut *self.state.lock() {
            ControllerState::Active { session, .. }
            | ControllerState::Ending { session, .. }
            | ControllerState::Ended { session, .. } => Ok(session.stats().to_vec()),
            ControllerState::Idle => Err(no_active_session().into()),
        }
    }

    pub fn status(&self) -> ControllerStatus {
        let state = self.state.lock();
        let (phase, id, session) = match &*state {
            ControllerState::Idle => (ControllerPhase::Idle, None, None),
            ControllerState::Active { id, session } => {
                (ControllerPhase::Active, Some(*id), Some(session))
            }
            ControllerState::Ending { id, session } => {
                (ControllerPhase::Ending, Some(*id), Some(session))
            }
            ControllerState::Ended { id, session } => {
                (ControllerPhase::Ended, Some(*id), Some(session))
            }
        };
        ControllerStatus {
            phase,
            session_id: id,
            running: session.is_some_and(|s| s.is_running()),
            current_player: session.and_then(|s| s.current_player().map(|p| p.id)),
            round: session.map_or(0, |s| s.round()),
            elapsed: session.map(|s| s.elapsed()).unwrap_or_default(),
        }
    }

    /// Stop the timers and write an active session one last time.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.cancel_timers();
        let active = matches!(*self.state.lock(), ControllerState::Active { .. });
        if active {
            self.save_now().await?;
        }
        Ok(())
    }

    fn cancel_timers(&self) {
        if let Some(token) = self.timers.lock().take() {
            token.cancel();
            debug!("session timers cancelled");
        }
    }

    fn spawn_timers(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.timers.lock().replace(token.clone()) {
            previous.cancel();
        }

        let quantum = Duration::from_millis(self.config.tick_quantum_ms.max(1));
        tokio::spawn(run_ticker(Arc::clone(&self.state), quantum, token.clone()));
        tokio::spawn(run_autosave(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            Arc::clone(&self.saves),
            self.config.autosave_interval,
            token,
        ));
    }
}

impl<S: SessionStore> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

async fn run_ticker(state: Arc<Mutex<ControllerState>>, quantum: Duration, stop: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + quantum, quantum);
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                if let ControllerState::Active { session, .. } = &mut *state.lock() {
                    session.tick();
                }
            }
        }
    }
}

/// Each due save is spawned on its own, so cancelling this loop never aborts
/// a write that already started.
async fn run_autosave<S: SessionStore>(
    store: Arc<S>,
    state: Arc<Mutex<ControllerState>>,
    saves: Arc<SaveGate>,
    every: Duration,
    stop: CancellationToken,
) {
    if every.is_zero() {
        return;
    }
    let mut timer = interval_at(Instant::now() + every, every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = timer.tick() => {
                let job = match &*state.lock() {
                    ControllerState::Active { id, session } if session.is_running() => {
                        Some(SaveJob::capture(&saves, *id, session))
                    }
                    _ => None,
                };
                let Some(job) = job else { continue };
                let store = Arc::clone(&store);
                let saves = Arc::clone(&saves);
                tokio::spawn(async move {
                    match saves.write(&job, &*store).await {
                        Ok(true) => debug!(session_id = job.id, turns = job.turns.len(), "autosave complete"),
                        Ok(false) => {}
                        Err(e) => warn!(session_id = job.id, error = %e, "autosave failed"),
                    }
                });
            }
        }
    }
}
