//! Retoia Core - Grid Construction Simulation Engine
//!
//! A tile-grid world shared by three scenarios: a city builder, an energy
//! grid and an industrial park. The engine tracks what is placed where,
//! derives power flow and economy state from it, wears entities down over
//! time, runs timed maintenance jobs and settles money on a clock.
//!
//! # Architecture
//!
//! - **Grid store**: which cell holds what, including multi-cell footprints
//! - **Entity registry**: stateful entities in a `hecs` world, indexed by cell
//! - **Network graph**: consumers and append-only power lines
//! - **Systems**: decay, maintenance, economy and game-over logic
//! - **Commands**: validated player actions; rejections change nothing
//!
//! The formulas themselves live in `retoia-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use retoia_core::prelude::*;
//!
//! let mut engine = SimulationEngine::for_scenario(Scenario::EnergyGrid)?;
//! engine.handle_key("1");
//! engine.click_at(2, 2)?;
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     let _frame = engine.snapshot();
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod commands;
pub mod components;
pub mod engine;
pub mod error;
pub mod grid;
pub mod network;
pub mod registry;
pub mod scenario;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::commands::{CommandOutcome, KeyCommand, Tool};
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
    pub use crate::error::{ConfigError, Rejection};
    pub use crate::scenario::ScenarioConfig;
    pub use crate::snapshot::EngineSnapshot;
    pub use retoia_logic::catalog::{EntityKind, Scenario};
    pub use retoia_logic::maintenance::MaintenanceKind;
}
