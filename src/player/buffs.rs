use bevy::prelude::*;
use crate::shared::*;

// ──────────────────────────────────────────────────────────────────────────────
// SYSTEM: tick_buff_durations
// ──────────────────────────────────────────────────────────────────────────────

/// Decrements `minutes_remaining` on every active buff once per game-minute.
/// Expired buffs are removed.
pub fn tick_buff_durations(
    calendar: Res<Calendar>,
    mut active_buffs: ResMut<ActiveBuffs>,
    mut last_minute: Local<u32>,
) {
    let current_minute = calendar.absolute_minute();
    if active_buffs.buffs.is_empty() {
        // Nothing to tick; keep the baseline current.
        *last_minute = current_minute;
        return;
    }

    let elapsed = if current_minute >= *last_minute {
        current_minute - *last_minute
    } else {
        // Clock moved backwards (save loaded); count it as a single minute.
        1
    };
    if elapsed == 0 {
        return;
    }
    *last_minute = current_minute;

    for label in expire_buffs(&mut active_buffs, elapsed) {
        info!("[Player] Buff '{}' wore off", label);
    }
}

/// Counts every buff down by `elapsed` minutes, drops the finished ones and
/// returns their labels.
pub fn expire_buffs(active_buffs: &mut ActiveBuffs, elapsed: u32) -> Vec<String> {
    let mut expired = Vec::new();
    for buff in active_buffs.buffs.iter_mut() {
        buff.minutes_remaining = buff.minutes_remaining.saturating_sub(elapsed);
        if buff.minutes_remaining == 0 {
            expired.push(buff.label.clone());
        }
    }
    active_buffs.buffs.retain(|b| b.minutes_remaining > 0);
    expired
}
