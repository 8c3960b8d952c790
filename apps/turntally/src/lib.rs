#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;
pub mod telemetry;

// Re-exports for public API
pub use config::db::{db_url, DbKind};
pub use config::session::{SessionConfig, VpClampPolicy};
pub use error::AppError;
pub use errors::domain::DomainError;
pub use infra::db::{bootstrap_db, connect_db};
pub use repos::memory::InMemoryStore;
pub use repos::sessions::SeaSessionStore;
pub use repos::SessionStore;
pub use services::controller::{ControllerPhase, ControllerStatus, SessionController};
pub use services::setup_store::SetupStore;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_support::logging::init();
}
