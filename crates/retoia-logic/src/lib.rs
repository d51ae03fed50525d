//! Pure simulation logic for Retoia.
//!
//! This crate holds the static catalog and every formula the engine applies,
//! independent of any engine state. Functions take plain data and return
//! results, so the tuning can be unit-tested without building a world.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Scenarios, entity kinds, static stats, build palettes |
//! | [`economy`] | Energy settlement, industrial turns, synergy scoring |
//! | [`maintenance`] | Wear, maintenance kinds, health bands, efficiency |
//! | [`network`] | Manhattan distance and power line efficiency |
//! | [`outcome`] | Energy grid loss conditions |

pub mod catalog;
pub mod economy;
pub mod maintenance;
pub mod network;
pub mod outcome;
