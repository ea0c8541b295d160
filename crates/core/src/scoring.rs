//! Scoring module - line clear points, leveling and gravity speed
//!
//! A clear of `n` rows at level `L` is worth `LINE_CLEAR_BONUS[n] * L` plus
//! `n * PER_LINE_POINTS * L`. Levels start at 1 and go up every ten lines.

use crate::types::{
    DROP_INTERVALS, DROP_INTERVAL_FLOOR_MS, LINES_PER_LEVEL, LINE_CLEAR_BONUS, PER_LINE_POINTS,
    SOFT_DROP_DIVISOR, SOFT_DROP_FLOOR_MS,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Clear-count bonus scaled by level.
    pub line_bonus: u32,
    /// Flat per-row points scaled by level.
    pub per_line_bonus: u32,
    pub total: u32,
}

/// Points for clearing `cleared` rows (0-4) at `level` (1-based).
pub fn calculate_line_clear_score(cleared: usize, level: u32) -> ScoreResult {
    if cleared == 0 || cleared >= LINE_CLEAR_BONUS.len() {
        return ScoreResult::default();
    }
    let line_bonus = LINE_CLEAR_BONUS[cleared] * level;
    let per_line_bonus = cleared as u32 * PER_LINE_POINTS * level;
    ScoreResult {
        line_bonus,
        per_line_bonus,
        total: line_bonus + per_line_bonus,
    }
}

/// Level management
/// Level increases every 10 lines cleared
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Get drop interval for a level (in milliseconds)
/// Returns interval based on level, clamped at minimum
pub fn drop_interval_ms(level: u32) -> u32 {
    let idx = level.saturating_sub(1) as usize;
    DROP_INTERVALS
        .get(idx)
        .copied()
        .unwrap_or(DROP_INTERVAL_FLOOR_MS)
}

/// Gravity interval while soft drop is held.
pub fn soft_drop_interval_ms(drop_interval: u32) -> u32 {
    (drop_interval / SOFT_DROP_DIVISOR).max(SOFT_DROP_FLOOR_MS)
}

/// Garbage rows owed to the opponent for a clear: one fewer than the rows cleared.
pub fn garbage_for_clear(cleared: usize) -> u8 {
    cleared.saturating_sub(1) as u8
}
