//! Key-value store for setup payloads, one JSON file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::players::GameSetup;
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

#[derive(Debug, Clone)]
pub struct SetupStore {
    dir: PathBuf,
}

impl SetupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys become file names, so only `[A-Za-z0-9_-]` is accepted.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::invalid(
                "INVALID_SETUP_KEY",
                format!("'{key}' is not a valid setup key"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Write the setup under `key`, replacing any previous one.
    pub async fn save(&self, key: &str, setup: &GameSetup) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        let body = serde_json::to_vec_pretty(setup)
            .map_err(|e| AppError::internal(format!("failed to encode setup: {e}")))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, players = setup.players.len(), "setup saved");
        Ok(())
    }

    /// `Ok(None)` when nothing was saved under `key`.
    pub async fn load(&self, key: &str) -> Result<Option<GameSetup>, AppError> {
        let path = self.path_for(key)?;
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<GameSetup>(&body) {
            Ok(setup) => Ok(Some(setup)),
            Err(e) => {
                warn!(key, error = %e, "stored setup is unreadable");
                Err(DomainError::persistence(
                    InfraErrorKind::DataCorruption,
                    format!("setup '{key}' could not be decoded: {e}"),
                )
                .into())
            }
        }
    }

    /// Like [`load`](Self::load), but a missing key is `NotFound`.
    pub async fn require(&self, key: &str) -> Result<GameSetup, AppError> {
        self.load(key).await?.ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Setup, format!("No setup saved under '{key}'"))
                .into()
        })
    }

    pub async fn remove(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
