//! Progress scoring shared by every game.

/// Mismatches a memory game forgives before they count as errors.
pub const FREE_MISMATCHES: u32 = 5;

/// Percentage of items answered correctly, rounded half up.
///
/// Returns 0 when there are no items.
pub fn progress_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    ((correct * 200 + total) / (total * 2)) as u8
}

/// Errors reported by a memory game: mismatches beyond the free allowance.
pub fn memory_error_count(mismatches: u32) -> u32 {
    mismatches.saturating_sub(FREE_MISMATCHES)
}
