//! Pure economy logic - settlement formulas, synergy scoring, index caps.
//!
//! Energy settles continuously on a short interval from the gap between
//! generation and connected demand. The industrial park settles discrete
//! turns from fixed income, production, index bonuses, upkeep and a waste
//! penalty. All money amounts are whole units; fractional terms are floored.

use serde::{Deserialize, Serialize};

use crate::catalog::EntityKind;

// ── Energy grid ─────────────────────────────────────────────────────────

/// Money per unit of demand actually served.
pub const ENERGY_TARIFF: f32 = 0.5;
/// Money per unit of generation nobody is connected to use.
pub const SURPLUS_TARIFF: f32 = 0.1;
/// Money lost per unit of connected demand left unserved.
pub const SHORTFALL_PENALTY: f32 = 1.0;

/// Result of one energy settlement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergySettlement {
    pub served: f32,
    pub surplus: f32,
    pub shortfall: f32,
    pub balance: i64,
}

/// Settle generation against connected demand.
pub fn settle_energy(production: f32, consumption: f32) -> EnergySettlement {
    let served = production.min(consumption).max(0.0);
    let surplus = (production - consumption).max(0.0);
    let shortfall = (consumption - production).max(0.0);
    let balance =
        (served * ENERGY_TARIFF + surplus * SURPLUS_TARIFF - shortfall * SHORTFALL_PENALTY).floor();
    EnergySettlement {
        served,
        surplus,
        shortfall,
        balance: balance as i64,
    }
}

// ── Industrial park ─────────────────────────────────────────────────────

/// Fixed income credited every turn.
pub const BASE_TURN_INCOME: i64 = 500;
/// Money per unit of (multiplied) production per turn.
pub const PRODUCTION_INCOME_RATE: f32 = 10.0;
/// Waste above this level is penalised.
pub const MAX_WASTE_TARGET: f32 = 200.0;
pub const WASTE_PENALTY_RATE: f32 = 5.0;
/// Index value above which the index pays a bonus.
pub const INDEX_BONUS_THRESHOLD: f32 = 50.0;
pub const INNOVATION_BONUS_RATE: f32 = 5.0;
pub const RESILIENCE_BONUS_RATE: f32 = 3.0;
/// Innovation and resilience are capped at this value.
pub const INDEX_CAP: f32 = 100.0;
/// Index value that unlocks a one-shot milestone.
pub const MILESTONE_THRESHOLD: f32 = 50.0;

/// Turn-persistent modifiers derived from innovation at the end of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndustrialModifiers {
    pub production_multiplier: f32,
    pub waste_reduction: f32,
}

impl Default for IndustrialModifiers {
    fn default() -> Self {
        Self {
            production_multiplier: 1.0,
            waste_reduction: 0.0,
        }
    }
}

impl IndustrialModifiers {
    pub fn from_innovation(innovation: f32) -> Self {
        Self {
            production_multiplier: 1.0 + (innovation / 100.0) * 0.5,
            waste_reduction: (innovation / 10.0).floor(),
        }
    }
}

/// Inputs to one industrial turn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TurnInputs {
    pub production: f32,
    pub waste: f32,
    pub innovation: f32,
    pub resilience: f32,
    pub upkeep: i64,
    pub production_multiplier: f32,
}

/// Every term of an industrial turn's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnBreakdown {
    pub base_income: i64,
    pub production_income: i64,
    pub innovation_bonus: i64,
    pub resilience_bonus: i64,
    pub upkeep: i64,
    pub waste_penalty: i64,
    pub balance: i64,
}

pub fn settle_turn(inputs: &TurnInputs) -> TurnBreakdown {
    let production_income =
        (inputs.production * inputs.production_multiplier * PRODUCTION_INCOME_RATE).floor() as i64;
    let waste_penalty = if inputs.waste > MAX_WASTE_TARGET {
        ((inputs.waste - MAX_WASTE_TARGET) * WASTE_PENALTY_RATE).floor() as i64
    } else {
        0
    };
    let innovation_bonus = if inputs.innovation > INDEX_BONUS_THRESHOLD {
        (inputs.innovation * INNOVATION_BONUS_RATE).floor() as i64
    } else {
        0
    };
    let resilience_bonus = if inputs.resilience > INDEX_BONUS_THRESHOLD {
        (inputs.resilience * RESILIENCE_BONUS_RATE).floor() as i64
    } else {
        0
    };
    let balance = BASE_TURN_INCOME + production_income + innovation_bonus + resilience_bonus
        - inputs.upkeep
        - waste_penalty;

    TurnBreakdown {
        base_income: BASE_TURN_INCOME,
        production_income,
        innovation_bonus,
        resilience_bonus,
        upkeep: inputs.upkeep,
        waste_penalty,
        balance,
    }
}

/// Apply a signed balance to money; money never goes negative.
pub fn apply_balance(money: i64, balance: i64) -> i64 {
    (money + balance).max(0)
}

// ── Synergy ─────────────────────────────────────────────────────────────

/// Read-only view of grid occupancy used for neighbourhood scoring.
pub trait Occupancy {
    fn size(&self) -> u32;
    fn kind_at(&self, x: u32, z: u32) -> Option<EntityKind>;
}

const ADJACENT: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

fn in_bounds(grid: &impl Occupancy, x: i64, z: i64) -> Option<(u32, u32)> {
    let size = grid.size() as i64;
    if x >= 0 && z >= 0 && x < size && z < size {
        Some((x as u32, z as u32))
    } else {
        None
    }
}

/// Occupied cells among the four orthogonal neighbours.
pub fn count_adjacent(grid: &impl Occupancy, x: u32, z: u32) -> u32 {
    ADJACENT
        .iter()
        .filter_map(|(dx, dz)| in_bounds(grid, x as i64 + dx, z as i64 + dz))
        .filter(|&(nx, nz)| grid.kind_at(nx, nz).is_some())
        .count() as u32
}

/// Occupied cells in the square of `radius` around a cell, excluding the
/// cell itself, whose kind satisfies `matches`.
pub fn count_within(
    grid: &impl Occupancy,
    x: u32,
    z: u32,
    radius: u32,
    matches: impl Fn(EntityKind) -> bool,
) -> u32 {
    let r = radius as i64;
    let mut count = 0;
    for dx in -r..=r {
        for dz in -r..=r {
            if dx == 0 && dz == 0 {
                continue;
            }
            if let Some((nx, nz)) = in_bounds(grid, x as i64 + dx, z as i64 + dz) {
                if grid.kind_at(nx, nz).is_some_and(&matches) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Index credit earned from placement patterns.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Synergy {
    pub innovation: f32,
    pub resilience: f32,
}

/// Score adjacency synergies for a set of placed buildings.
///
/// - any building with two or more occupied neighbours: +1 innovation, +2 resilience
/// - research center: +2 innovation per clean factory within 3 cells
/// - recycling plant: +1 resilience per occupied cell within 2 cells
pub fn synergy_bonus(
    grid: &impl Occupancy,
    buildings: impl IntoIterator<Item = (EntityKind, u32, u32)>,
) -> Synergy {
    let mut synergy = Synergy::default();
    for (kind, x, z) in buildings {
        if count_adjacent(grid, x, z) >= 2 {
            synergy.innovation += 1.0;
            synergy.resilience += 2.0;
        }
        match kind {
            EntityKind::ResearchCenter => {
                let factories = count_within(grid, x, z, 3, |k| k == EntityKind::CleanFactory);
                synergy.innovation += factories as f32 * 2.0;
            }
            EntityKind::RecyclingPlant => {
                synergy.resilience += count_within(grid, x, z, 2, |_| true) as f32;
            }
            _ => {}
        }
    }
    synergy
}
