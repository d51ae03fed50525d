//! Grid coordinates and occupant records.

use retoia_logic::catalog::EntityKind;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub z: u32,
}

impl Cell {
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.x, self.z)
    }
}

impl From<(u32, u32)> for Cell {
    fn from((x, z): (u32, u32)) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// What occupies a cell.
///
/// Multi-cell footprints write one record per covered cell; every shadow
/// points back at the anchor, which is the only cell removal and export
/// logic act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub kind: EntityKind,
    /// World-seeded content the player cannot remove.
    pub permanent: bool,
    pub anchor: Cell,
}

impl CellRecord {
    pub fn new(kind: EntityKind, permanent: bool, anchor: Cell) -> Self {
        Self {
            kind,
            permanent,
            anchor,
        }
    }

    pub fn is_anchor_of(&self, cell: Cell) -> bool {
        self.anchor == cell
    }
}
