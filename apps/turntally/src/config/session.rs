//! Session tuning: victory threshold, pending-VP clamping, clock cadence.
//!
//! Every value is configuration rather than a constant; `from_env` reads the
//! `TURNTALLY_*` variables and falls back to the defaults below.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_VICTORY_THRESHOLD: u32 = 30;
pub const DEFAULT_TICK_QUANTUM_MS: u64 = 1000;
pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;

/// How pending VP entries are bounded before they are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VpClampPolicy {
    /// Any integer, including negative corrections.
    #[default]
    Unbounded,
    /// Entries are clamped into `min..=max`.
    Range { min: i32, max: i32 },
}

impl VpClampPolicy {
    pub fn range(min: i32, max: i32) -> Result<Self, AppError> {
        if min > max {
            return Err(AppError::config(format!(
                "pending VP range is empty: min {min} > max {max}"
            )));
        }
        Ok(Self::Range { min, max })
    }

    /// Clamp an entered value according to the policy. Never rejects.
    pub fn apply(&self, value: i32) -> i32 {
        match *self {
            VpClampPolicy::Unbounded => value,
            VpClampPolicy::Range { min, max } => value.clamp(min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reaching this total while running forces a pause.
    pub victory_threshold: u32,
    pub pending_vp: VpClampPolicy,
    /// Milliseconds added to each counter per tick.
    pub tick_quantum_ms: u64,
    /// Cadence of the background autosave while running.
    pub autosave_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            victory_threshold: DEFAULT_VICTORY_THRESHOLD,
            pending_vp: VpClampPolicy::Unbounded,
            tick_quantum_ms: DEFAULT_TICK_QUANTUM_MS,
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_SECS),
        }
    }
}

impl SessionConfig {
    pub fn with_victory_threshold(mut self, threshold: u32) -> Self {
        self.victory_threshold = threshold;
        self
    }

    pub fn with_pending_vp(mut self, policy: VpClampPolicy) -> Self {
        self.pending_vp = policy;
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// Build from `TURNTALLY_VICTORY_THRESHOLD`, `TURNTALLY_VP_MIN`,
    /// `TURNTALLY_VP_MAX` and `TURNTALLY_AUTOSAVE_SECS`.
    ///
    /// The VP range applies only when both bounds are set.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(threshold) = parse_var::<u32>("TURNTALLY_VICTORY_THRESHOLD")? {
            config.victory_threshold = threshold;
        }

        let min = parse_var::<i32>("TURNTALLY_VP_MIN")?;
        let max = parse_var::<i32>("TURNTALLY_VP_MAX")?;
        match (min, max) {
            (Some(min), Some(max)) => config.pending_vp = VpClampPolicy::range(min, max)?,
            (None, None) => {}
            _ => {
                return Err(AppError::config(
                    "TURNTALLY_VP_MIN and TURNTALLY_VP_MAX must be set together",
                ))
            }
        }

        if let Some(secs) = parse_var::<u64>("TURNTALLY_AUTOSAVE_SECS")? {
            if secs == 0 {
                return Err(AppError::config("TURNTALLY_AUTOSAVE_SECS must be at least 1"));
            }
            config.autosave_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Read an optional environment variable and parse it.
fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::config(format!("Environment variable '{name}' has invalid value '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}
