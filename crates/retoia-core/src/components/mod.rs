//! Component definitions for the engine.
//!
//! Components are plain data. Entity components live in the registry's ECS
//! world; grid and network records live in their own stores.

mod entity;
mod grid;
mod network;

pub use entity::*;
pub use grid::*;
pub use network::*;
