//! Scoring module - fixed line-clear table
//!
//! Points depend only on how many lines one lock cleared. The table is not
//! linear: clearing four rows at once pays more than four single clears.

use crate::types::LINE_SCORES;

/// Points awarded for clearing `lines` rows with a single lock
///
/// Counts past the table (more than four rows) award nothing.
pub fn line_clear_score(lines: u32) -> u32 {
    LINE_SCORES.get(lines as usize).copied().unwrap_or(0)
}
