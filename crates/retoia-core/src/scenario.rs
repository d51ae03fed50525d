//! Scenario configuration and permanent world seeding.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use retoia_logic::catalog::{EntityKind, KindClass, Scenario};
use serde::{Deserialize, Serialize};

use crate::components::Cell;
use crate::error::ConfigError;
use crate::grid::GridStore;
use crate::network::NetworkGraph;

/// A permanent decoration placed at scenario start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenerySeed {
    pub kind: EntityKind,
    pub x: u32,
    pub z: u32,
    /// Footprint radius; 0 covers only the anchor cell.
    #[serde(default)]
    pub radius: u32,
}

/// Largest accepted grid edge, in cells.
pub const MAX_GRID_SIZE: u32 = 512;

/// Clock intervals in simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    pub decay_secs: f64,
    pub settlement_secs: f64,
    pub turn_secs: f64,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            decay_secs: 1.0,
            settlement_secs: 3.0,
            turn_secs: 40.0,
        }
    }
}

/// Everything needed to build a scenario session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario: Scenario,
    pub grid_size: u32,
    pub starting_money: i64,
    pub consumer_count: u32,
    pub consumer_demand_min: u32,
    pub consumer_demand_max: u32,
    /// Fixed seed for reproducible consumer placement. `None` draws from
    /// entropy on every seeding.
    pub seed: Option<u64>,
    pub scenery: Vec<ScenerySeed>,
    /// Share of an entity's cost returned on removal (energy and industrial).
    pub refund_fraction: f64,
    pub intervals: Intervals,
}

/// Optional overrides read from JSON. Anything left out keeps the
/// scenario's default.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    scenario: Scenario,
    grid_size: Option<u32>,
    starting_money: Option<i64>,
    consumer_count: Option<u32>,
    consumer_demand_min: Option<u32>,
    consumer_demand_max: Option<u32>,
    seed: Option<u64>,
    scenery: Option<Vec<ScenerySeed>>,
    refund_fraction: Option<f64>,
    intervals: Option<Intervals>,
}

impl ScenarioConfig {
    pub fn for_scenario(scenario: Scenario) -> Self {
        let base = Self {
            scenario,
            grid_size: 20,
            starting_money: 0,
            consumer_count: 0,
            consumer_demand_min: 0,
            consumer_demand_max: 0,
            seed: None,
            scenery: Vec::new(),
            refund_fraction: 0.5,
            intervals: Intervals::default(),
        };
        match scenario {
            Scenario::CityBuilder => Self {
                grid_size: 10,
                starting_money: 100,
                scenery: vec![
                    ScenerySeed {
                        kind: EntityKind::Tree,
                        x: 7,
                        z: 2,
                        radius: 1,
                    },
                    ScenerySeed {
                        kind: EntityKind::Rock,
                        x: 1,
                        z: 8,
                        radius: 0,
                    },
                ],
                ..base
            },
            Scenario::EnergyGrid => Self {
                grid_size: 20,
                starting_money: 5000,
                consumer_count: 4,
                consumer_demand_min: 20,
                consumer_demand_max: 60,
                ..base
            },
            Scenario::IndustrialPark => Self {
                grid_size: 50,
                starting_money: 15000,
                ..base
            },
        }
    }

    /// Parse a JSON config. Only `scenario` is required; other fields
    /// override that scenario's defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        let mut config = Self::for_scenario(overrides.scenario);
        if let Some(v) = overrides.grid_size {
            config.grid_size = v;
        }
        if let Some(v) = overrides.starting_money {
            config.starting_money = v;
        }
        if let Some(v) = overrides.consumer_count {
            config.consumer_count = v;
        }
        if let Some(v) = overrides.consumer_demand_min {
            config.consumer_demand_min = v;
        }
        if let Some(v) = overrides.consumer_demand_max {
            config.consumer_demand_max = v;
        }
        if overrides.seed.is_some() {
            config.seed = overrides.seed;
        }
        if let Some(v) = overrides.scenery {
            config.scenery = v;
        }
        if let Some(v) = overrides.refund_fraction {
            config.refund_fraction = v;
        }
        if let Some(v) = overrides.intervals {
            config.intervals = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if !(0.0..=1.0).contains(&self.refund_fraction) {
            return Err(ConfigError::RefundFraction(self.refund_fraction));
        }
        let intervals = [
            ("decay", self.intervals.decay_secs),
            ("settlement", self.intervals.settlement_secs),
            ("turn", self.intervals.turn_secs),
        ];
        for (name, secs) in intervals {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::Interval { name, secs });
            }
        }
        if self.consumer_demand_min > self.consumer_demand_max {
            return Err(ConfigError::DemandRange {
                min: self.consumer_demand_min,
                max: self.consumer_demand_max,
            });
        }
        let mut grid = GridStore::new(self.grid_size);
        for seed in &self.scenery {
            if seed.kind.class() != KindClass::Scenery {
                return Err(ConfigError::NotScenery(seed.kind));
            }
            let cell = Cell::new(seed.x, seed.z);
            if !grid.in_bounds(cell) {
                return Err(ConfigError::SceneryOutOfBounds {
                    kind: seed.kind,
                    cell,
                    size: self.grid_size,
                });
            }
            let _ = grid.footprint_place(cell, seed.radius, seed.kind, true);
        }
        let free = grid.empty_cells().count() as u32;
        if self.consumer_count > free {
            return Err(ConfigError::TooManyConsumers {
                requested: self.consumer_count,
                free,
            });
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Lay down the scenario's permanent content: scenery footprints first,
/// then consumers on random empty cells.
pub fn seed_world(config: &ScenarioConfig, grid: &mut GridStore, network: &mut NetworkGraph) {
    for seed in &config.scenery {
        let anchor = Cell::new(seed.x, seed.z);
        if let Err(rejection) = grid.footprint_place(anchor, seed.radius, seed.kind, true) {
            log::warn!("Skipping {} seed: {}", seed.kind.name(), rejection);
        }
    }

    if config.consumer_count == 0 {
        return;
    }
    let mut rng = config.rng();
    let free: Vec<Cell> = grid.empty_cells().collect();
    let chosen: Vec<Cell> = free
        .choose_multiple(&mut rng, config.consumer_count as usize)
        .copied()
        .collect();
    for cell in chosen {
        let demand = rng.gen_range(config.consumer_demand_min..=config.consumer_demand_max);
        if grid.place(cell, EntityKind::Consumer, true).is_ok() {
            network.add_consumer(cell, demand);
        }
    }
    log::info!(
        "Seeded {} consumers with {} total demand",
        network.consumers().len(),
        network.consumers().iter().map(|c| c.demand).sum::<u32>()
    );
}
