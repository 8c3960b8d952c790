//! Score board operations on a single player's victory points.

use crate::config::session::VpClampPolicy;
use crate::domain::players::Player;

/// Store a pending delta for the player after applying the clamp policy.
/// Returns the value actually stored.
pub fn set_pending_vp(player: &mut Player, value: i32, policy: &VpClampPolicy) -> i32 {
    let clamped = policy.apply(value);
    player.pending_vp = clamped;
    clamped
}

/// Fold the pending delta into the total, flooring the total at zero, and
/// reset pending. Returns the delta that was actually applied, which differs
/// from the pending value only when the floor kicked in.
pub fn commit_pending_vp(player: &mut Player) -> i32 {
    let before = i64::from(player.total_vp);
    let after = (before + i64::from(player.pending_vp)).clamp(0, i64::from(u32::MAX));
    player.total_vp = after as u32;
    player.pending_vp = 0;
    (after - before) as i32
}

/// True when any player's committed total is at or above the threshold.
pub fn victory_reached(players: &[Player], threshold: u32) -> bool {
    players.iter().any(|p| p.total_vp >= threshold)
}
