//! Shared test utilities for the turntally workspace.
//!
//! Provides the unified test logging bootstrap and small helpers for
//! generating unique fixture data.

pub mod logging;

use ulid::Ulid;

/// Generate a unique display name with the given prefix.
///
/// ```
/// use test_support::unique_name;
///
/// let a = unique_name("player");
/// let b = unique_name("player");
/// assert_ne!(a, b);
/// assert!(a.starts_with("player-"));
/// ```
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}
