//! Power line geometry and loss.
//!
//! Line efficiency falls linearly with Manhattan distance and is clamped to a
//! floor. UI colour thresholds are tuned against this shape, so both the
//! slope and the floor are part of the contract.

/// Efficiency lost per cell of cable.
pub const LINE_LOSS_FACTOR: f32 = 0.02;

/// Lowest efficiency any line can have, however long.
pub const MIN_LINE_EFFICIENCY: f32 = 0.3;

/// Lines below this efficiency are flagged as inefficient.
pub const INEFFICIENT_LINE_THRESHOLD: f32 = 0.6;

/// Manhattan distance between two cells.
pub fn manhattan(from: (u32, u32), to: (u32, u32)) -> u32 {
    from.0.abs_diff(to.0) + from.1.abs_diff(to.1)
}

/// Efficiency of a line spanning `distance` cells.
pub fn line_efficiency(distance: u32) -> f32 {
    (1.0 - distance as f32 * LINE_LOSS_FACTOR).max(MIN_LINE_EFFICIENCY)
}

pub fn is_inefficient(efficiency: f32) -> bool {
    efficiency < INEFFICIENT_LINE_THRESHOLD
}
