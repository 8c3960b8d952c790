//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; the gateway implementation converts it
//! here so callers only ever see `DomainError`.

use tracing::{error, warn};

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind, ValidationKind};

/// Prefix for the structured "session not found" error raised by adapters.
pub const SESSION_NOT_FOUND_PREFIX: &str = "SESSION_NOT_FOUND:";

/// Prefix for stored rows that cannot be decoded into domain values.
pub const CORRUPT_ROW_PREFIX: &str = "CORRUPT_ROW:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Translate a `DbErr` into a `DomainError`.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(msg) if msg.starts_with("Player") => {
            return DomainError::not_found(NotFoundKind::Player, msg.clone());
        }
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(
                NotFoundKind::Other("Record".into()),
                "Record not found",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(SESSION_NOT_FOUND_PREFIX) => {
            let raw = msg.trim_start_matches(SESSION_NOT_FOUND_PREFIX);
            warn!(session_id = raw, "Session not found");
            return DomainError::not_found(
                NotFoundKind::Session,
                format!("Session {raw} not found"),
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(CORRUPT_ROW_PREFIX) => {
            let detail = msg.trim_start_matches(CORRUPT_ROW_PREFIX);
            error!(detail, "Stored row could not be decoded");
            return DomainError::persistence(InfraErrorKind::DataCorruption, detail.to_string());
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::persistence(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");
        if error_msg.contains("display_name") || error_msg.contains("ux_session_players_session_name") {
            return DomainError::validation(
                ValidationKind::DuplicateName,
                "Player name already used in this session",
            );
        }
        return DomainError::persistence(
            InfraErrorKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed") {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::not_found(NotFoundKind::Session, "Referenced session does not exist");
    }

    if error_msg.contains("timeout")
        || error_msg.contains("pool")
        || error_msg.contains("unavailable")
    {
        warn!(raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::persistence(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::persistence(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
