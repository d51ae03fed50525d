//! Entity catalog - every placeable or seeded kind and its static stats.
//!
//! Kinds form a closed enum so lookups are exhaustive `match`es rather than
//! string-keyed tables. Each scenario exposes an ordered palette of the kinds
//! the player may build; digit shortcuts index into that palette.

use serde::{Deserialize, Serialize};

/// The three playable scenarios sharing the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    CityBuilder,
    EnergyGrid,
    IndustrialPark,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::CityBuilder,
        Scenario::EnergyGrid,
        Scenario::IndustrialPark,
    ];

    /// Player-buildable kinds in shortcut order (key `1` selects index 0).
    pub fn palette(self) -> &'static [EntityKind] {
        match self {
            Scenario::CityBuilder => &[
                EntityKind::House,
                EntityKind::Tower,
                EntityKind::Factory,
                EntityKind::Park,
                EntityKind::Road,
            ],
            Scenario::EnergyGrid => &[
                EntityKind::Solar,
                EntityKind::Wind,
                EntityKind::Hydro,
                EntityKind::Nuclear,
                EntityKind::Battery,
            ],
            Scenario::IndustrialPark => &[
                EntityKind::CleanFactory,
                EntityKind::ResearchCenter,
                EntityKind::RecyclingPlant,
                EntityKind::Warehouse,
                EntityKind::SolarPanel,
                EntityKind::SmartHub,
            ],
        }
    }

    pub fn allows(self, kind: EntityKind) -> bool {
        self.palette().contains(&kind)
    }

    /// Whether sources in this scenario wear down and can end the game.
    pub fn has_decay(self) -> bool {
        matches!(self, Scenario::EnergyGrid)
    }
}

/// Every kind of grid occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    // City
    House,
    Tower,
    Factory,
    Park,
    Road,

    // Energy
    Solar,
    Wind,
    Hydro,
    Nuclear,
    Battery,

    // Industrial
    CleanFactory,
    ResearchCenter,
    RecyclingPlant,
    Warehouse,
    SolarPanel,
    SmartHub,

    // Seeded world content
    Tree,
    Rock,
    Consumer,
}

/// Broad behaviour class of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindClass {
    /// Stateful building tracked by the entity registry.
    Building,
    /// Energy producer (or connectable node) tracked by the entity registry.
    Source,
    /// Walkway tile; other buildings may replace it.
    Walkway,
    /// Permanent decoration, possibly with a multi-cell footprint.
    Scenery,
    /// Power consumer seeded at scenario start.
    Consumer,
}

/// Static stats for one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    pub name: &'static str,
    pub class: KindClass,
    pub cost: i64,
    /// Base output per settlement (energy units or industrial goods).
    pub production: f32,
    /// Waste or emissions; negative values clean up after neighbours.
    pub waste: f32,
    pub innovation: f32,
    pub resilience: f32,
    /// Per-turn upkeep, and the base price of a maintenance job.
    pub upkeep: i64,
    /// City score granted on placement.
    pub points: i64,
    /// Fraction of full health lost per second.
    pub degradation_rate: f32,
}

const fn building(name: &'static str, cost: i64, points: i64) -> KindStats {
    KindStats {
        name,
        class: KindClass::Building,
        cost,
        production: 0.0,
        waste: 0.0,
        innovation: 0.0,
        resilience: 0.0,
        upkeep: 0,
        points,
        degradation_rate: 0.0,
    }
}

const fn source(
    name: &'static str,
    cost: i64,
    production: f32,
    waste: f32,
    upkeep: i64,
    degradation_rate: f32,
) -> KindStats {
    KindStats {
        name,
        class: KindClass::Source,
        cost,
        production,
        waste,
        innovation: 0.0,
        resilience: 0.0,
        upkeep,
        points: 0,
        degradation_rate,
    }
}

#[allow(clippy::too_many_arguments)]
const fn industrial(
    name: &'static str,
    cost: i64,
    production: f32,
    waste: f32,
    innovation: f32,
    resilience: f32,
    upkeep: i64,
) -> KindStats {
    KindStats {
        name,
        class: KindClass::Building,
        cost,
        production,
        waste,
        innovation,
        resilience,
        upkeep,
        points: 0,
        degradation_rate: 0.0,
    }
}

const fn fixture(name: &'static str, class: KindClass) -> KindStats {
    KindStats {
        name,
        class,
        cost: 0,
        production: 0.0,
        waste: 0.0,
        innovation: 0.0,
        resilience: 0.0,
        upkeep: 0,
        points: 0,
        degradation_rate: 0.0,
    }
}

impl EntityKind {
    pub fn stats(self) -> KindStats {
        match self {
            EntityKind::House => building("House", 10, 5),
            EntityKind::Tower => building("Tower", 20, 15),
            EntityKind::Factory => building("Factory", 15, 10),
            EntityKind::Park => building("Park", 5, 3),
            EntityKind::Road => KindStats {
                cost: 1,
                ..fixture("Road", KindClass::Walkway)
            },

            EntityKind::Solar => source("Solar", 150, 50.0, 0.0, 20, 0.0010),
            EntityKind::Wind => source("Wind", 250, 80.0, 0.0, 30, 0.0015),
            EntityKind::Hydro => source("Hydro", 600, 150.0, 1.0, 50, 0.0008),
            EntityKind::Nuclear => source("Nuclear", 1200, 400.0, 5.0, 100, 0.0020),
            EntityKind::Battery => source("Battery", 300, 0.0, 0.0, 15, 0.0012),

            EntityKind::CleanFactory => industrial("Clean Factory", 2000, 50.0, 8.0, 2.0, 5.0, 50),
            EntityKind::ResearchCenter => {
                industrial("Research Center", 3500, 10.0, 2.0, 15.0, 3.0, 100)
            }
            EntityKind::RecyclingPlant => {
                industrial("Recycling Plant", 2500, 5.0, -40.0, 5.0, 8.0, 80)
            }
            EntityKind::Warehouse => industrial("Warehouse", 1200, 15.0, 3.0, 1.0, 10.0, 30),
            EntityKind::SolarPanel => industrial("Solar Panel", 1800, 20.0, 0.0, 8.0, 12.0, 40),
            EntityKind::SmartHub => industrial("Smart Hub", 4000, 30.0, 5.0, 20.0, 15.0, 120),

            EntityKind::Tree => fixture("Tree", KindClass::Scenery),
            EntityKind::Rock => fixture("Rock", KindClass::Scenery),
            EntityKind::Consumer => fixture("Consumer", KindClass::Consumer),
        }
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }

    pub fn class(self) -> KindClass {
        self.stats().class
    }

    /// Occupants tracked by the entity registry (health, maintenance, etc).
    pub fn is_registered(self) -> bool {
        matches!(self.class(), KindClass::Building | KindClass::Source)
    }

    /// Occupants that hold a cell but carry no gameplay state.
    pub fn is_decorative(self) -> bool {
        matches!(self.class(), KindClass::Walkway | KindClass::Scenery)
    }

    /// Whether a new placement may overwrite this occupant.
    pub fn is_replaceable(self) -> bool {
        matches!(self.class(), KindClass::Walkway)
    }

    /// Registered energy kinds that actually generate power.
    pub fn is_producer(self) -> bool {
        self.class() == KindClass::Source && self.stats().production > 0.0
    }
}
