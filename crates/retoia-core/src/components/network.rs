//! Power network records.

use super::grid::Cell;
use serde::{Deserialize, Serialize};

/// A committed power line between two occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLine {
    pub from: Cell,
    pub to: Cell,
    /// Manhattan distance between the endpoints.
    pub distance: u32,
    pub efficiency: f32,
}

impl PowerLine {
    pub fn touches(&self, cell: Cell) -> bool {
        self.from == cell || self.to == cell
    }
}

/// A power consumer seeded at scenario start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub cell: Cell,
    pub demand: u32,
    /// Recomputed wholesale whenever the line list changes.
    pub connected: bool,
}

impl Consumer {
    pub fn new(cell: Cell, demand: u32) -> Self {
        Self {
            cell,
            demand,
            connected: false,
        }
    }
}
