//! Command rejections and configuration errors.
//!
//! Rejections are ordinary outcomes of player misclicks. They are returned,
//! logged at debug level, and never abort the frame loop.

use crate::components::Cell;
use retoia_logic::catalog::EntityKind;
use thiserror::Error;

/// Why a command was refused. Every rejection leaves the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("cell {0} is already occupied")]
    OccupiedCell(Cell),
    #[error("cell {0} is empty")]
    Empty(Cell),
    #[error("cell {0} holds permanent scenery")]
    Permanent(Cell),
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: i64, available: i64 },
    #[error("no entity at power line endpoint {0}")]
    NoEntityAtEndpoint(Cell),
    #[error("entity at {0} is already under maintenance")]
    AlreadyInMaintenance(Cell),
    #[error("cell {0} is outside the grid")]
    OutOfBounds(Cell),
    #[error("no suitable tool selected")]
    NoToolSelected,
    #[error("{} cannot be built in this scenario", .0.name())]
    UnavailableInScenario(EntityKind),
    #[error("the session is over; reset to continue")]
    Frozen,
}

/// Problems loading or validating a scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scenario config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("grid size {size} exceeds the maximum of {max}")]
    GridTooLarge { size: u32, max: u32 },
    #[error("refund fraction {0} must be within 0..=1")]
    RefundFraction(f64),
    #[error("{name} interval must be a positive number of seconds, got {secs}")]
    Interval { name: &'static str, secs: f64 },
    #[error("consumer demand range {min}..={max} is inverted")]
    DemandRange { min: u32, max: u32 },
    #[error("scenery seed {kind:?} at {cell} is outside the {size}x{size} grid")]
    SceneryOutOfBounds {
        kind: EntityKind,
        cell: Cell,
        size: u32,
    },
    #[error("{requested} consumers do not fit in {free} free cells")]
    TooManyConsumers { requested: u32, free: u32 },
    #[error("{0:?} is not scenery")]
    NotScenery(EntityKind),
}
