use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind, ValidationKind};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: &'static str, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Persistence error: {detail}")]
    Persistence { detail: String },
    #[error("Invariant violated: {detail}")]
    Invariant { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. } => code,
            AppError::NotFound { code, .. } => code,
            AppError::Persistence { .. } => "PERSISTENCE_ERROR",
            AppError::Invariant { .. } => "INVARIANT_VIOLATION",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Internal { .. } => "INTERNAL",
        }
    }

    /// Persistence failures leave the session untouched and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Persistence { .. })
    }

    pub fn invalid(code: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

fn validation_code(kind: &ValidationKind) -> &'static str {
    match kind {
        ValidationKind::NoPlayers => "NO_PLAYERS",
        ValidationKind::BlankName => "BLANK_NAME",
        ValidationKind::DuplicateName => "DUPLICATE_NAME",
        ValidationKind::DuplicateColor => "DUPLICATE_COLOR",
        ValidationKind::UnknownColor => "UNKNOWN_COLOR",
        ValidationKind::UnknownPlayer => "UNKNOWN_PLAYER",
        ValidationKind::NotRunning => "NOT_RUNNING",
        ValidationKind::SessionEnding => "SESSION_ENDING",
        ValidationKind::SessionEnded => "SESSION_ENDED",
        ValidationKind::NoActiveSession => "NO_ACTIVE_SESSION",
        ValidationKind::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
        ValidationKind::Other(_) => "VALIDATION_ERROR",
    }
}

fn not_found_code(kind: &NotFoundKind) -> &'static str {
    match kind {
        NotFoundKind::Session => "SESSION_NOT_FOUND",
        NotFoundKind::Player => "PLAYER_NOT_FOUND",
        NotFoundKind::Setup => "SETUP_NOT_FOUND",
        NotFoundKind::Other(_) => "NOT_FOUND",
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => AppError::Validation {
                code: validation_code(&kind),
                detail,
            },
            DomainError::NotFound(kind, detail) => AppError::NotFound {
                code: not_found_code(&kind),
                detail,
            },
            DomainError::Persistence(kind, detail) => AppError::Persistence {
                detail: format!("{kind:?}: {detail}"),
            },
            DomainError::Invariant(detail) => AppError::Invariant { detail },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(err).into()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        DomainError::persistence(InfraErrorKind::Io, err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_validation_maps_to_stable_code() {
        let app: AppError =
            DomainError::validation(ValidationKind::DuplicateColor, "Red used twice").into();
        assert_eq!(app.code(), "DUPLICATE_COLOR");
        assert!(!app.is_retryable());
    }

    #[test]
    fn domain_persistence_is_retryable() {
        let app: AppError =
            DomainError::persistence(InfraErrorKind::DbUnavailable, "down").into();
        assert_eq!(app.code(), "PERSISTENCE_ERROR");
        assert!(app.is_retryable());
    }

    #[test]
    fn not_found_session_code() {
        let app: AppError = DomainError::not_found(NotFoundKind::Session, "42").into();
        assert_eq!(app.code(), "SESSION_NOT_FOUND");
    }

    #[test]
    fn io_failures_are_retryable_persistence() {
        let app: AppError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_eq!(app.code(), "PERSISTENCE_ERROR");
        assert!(app.is_retryable());
        assert!(app.to_string().contains("Io"));
    }
}
