#![allow(dead_code)]

// tests/common/mod.rs
use time::macros::datetime;
use time::OffsetDateTime;
use turntally::domain::players::{GameSetup, PlayerColor, PlayerSetup};
use turntally::{bootstrap_db, DbKind, SeaSessionStore};

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

/// Whole-second UTC instant; survives every backend's timestamp encoding.
pub const PLAYED_AT: OffsetDateTime = datetime!(2026-10-19 20:15 UTC);

/// Seats the given names in order, with palette colors.
pub fn setup_of(names: &[&str]) -> GameSetup {
    GameSetup::new(
        names
            .iter()
            .zip(PlayerColor::PALETTE)
            .map(|(name, color)| PlayerSetup::named(*name).with_color(color))
            .collect(),
    )
}

/// Fresh in-memory SQLite database with the schema applied.
pub async fn sqlite_store() -> SeaSessionStore {
    let db = bootstrap_db(DbKind::SqliteMemory)
        .await
        .expect("in-memory sqlite should bootstrap");
    SeaSessionStore::new(db)
}
