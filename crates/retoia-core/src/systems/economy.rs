//! Economy system - wallet, aggregate recomputation and settlement

use retoia_logic::catalog::Scenario;
use retoia_logic::economy::{
    self, settle_energy, settle_turn, synergy_bonus, EnergySettlement, IndustrialModifiers,
    TurnBreakdown, TurnInputs, INDEX_CAP, MILESTONE_THRESHOLD,
};
use retoia_logic::maintenance::HealthBand;
use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::grid::GridStore;
use crate::network::NetworkGraph;
use crate::registry::EntityRegistry;

/// Player money. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    money: i64,
}

impl Wallet {
    pub fn new(money: i64) -> Self {
        Self {
            money: money.max(0),
        }
    }

    pub fn money(&self) -> i64 {
        self.money
    }

    pub fn can_afford(&self, cost: i64) -> bool {
        self.money >= cost
    }

    /// Debit `cost`, or refuse without touching the balance.
    pub fn try_spend(&mut self, cost: i64) -> Result<(), Rejection> {
        if !self.can_afford(cost) {
            return Err(Rejection::InsufficientFunds {
                cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }

    pub fn credit(&mut self, amount: i64) {
        self.money += amount.max(0);
    }

    /// Apply a signed settlement, flooring at zero. Returns the new balance.
    pub fn apply_balance(&mut self, balance: i64) -> i64 {
        self.money = economy::apply_balance(self.money, balance);
        self.money
    }

    pub fn reset(&mut self, money: i64) {
        self.money = money.max(0);
    }
}

/// Derived economy state. A pure function of the stores, recomputed
/// wholesale after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregates {
    pub production: f32,
    pub consumption: f32,
    /// Waste (industrial) or emissions (energy).
    pub waste: f32,
    pub energy_balance: f32,
    /// Mean effective efficiency, as a percentage.
    pub average_efficiency: f32,
    pub innovation: f32,
    pub resilience: f32,
    pub upkeep: i64,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub inefficient_lines: bool,
    pub building_count: usize,
    /// City score; tracks money.
    pub score: i64,
}

/// Read access to everything aggregates are derived from.
pub struct EconomyInputs<'a> {
    pub scenario: Scenario,
    pub grid: &'a GridStore,
    pub network: &'a NetworkGraph,
    pub modifiers: IndustrialModifiers,
    pub money: i64,
    pub now: f64,
}

/// Recompute every aggregate. Expired bonuses are dropped first.
pub fn recompute_aggregates(registry: &mut EntityRegistry, inputs: &EconomyInputs) -> Aggregates {
    registry.clear_expired_bonuses(inputs.now);
    let entities = registry.all();

    let mut agg = Aggregates {
        building_count: entities.len(),
        inefficient_lines: inputs.network.has_inefficient_lines(),
        ..Default::default()
    };

    let mut efficiency_sum = 0.0;
    for view in &entities {
        let stats = view.kind.stats();
        let efficiency = view.effective_efficiency(inputs.now);
        efficiency_sum += efficiency;
        agg.upkeep += stats.upkeep;
        match HealthBand::from_health(view.health) {
            HealthBand::Healthy => agg.healthy += 1,
            HealthBand::Warning => agg.warning += 1,
            HealthBand::Critical => agg.critical += 1,
        }

        match inputs.scenario {
            Scenario::EnergyGrid => {
                if view.kind.is_producer() {
                    // Sources without a line still deliver at full edge factor.
                    let edge = inputs.network.first_line_efficiency(view.cell).unwrap_or(1.0);
                    agg.production += stats.production * efficiency * edge;
                }
                agg.waste += stats.waste;
            }
            Scenario::IndustrialPark => {
                agg.production += stats.production;
                agg.waste += stats.waste;
                agg.innovation += stats.innovation;
                agg.resilience += stats.resilience;
            }
            Scenario::CityBuilder => {}
        }
    }
    if !entities.is_empty() {
        agg.average_efficiency = efficiency_sum / entities.len() as f32 * 100.0;
    }

    match inputs.scenario {
        Scenario::EnergyGrid => {
            agg.consumption = inputs.network.connected_demand() as f32;
            agg.energy_balance = agg.production - agg.consumption;
        }
        Scenario::IndustrialPark => {
            let synergy = synergy_bonus(
                inputs.grid,
                entities.iter().map(|v| (v.kind, v.cell.x, v.cell.z)),
            );
            agg.waste = (agg.waste - inputs.modifiers.waste_reduction).max(0.0);
            agg.innovation = (agg.innovation + synergy.innovation).min(INDEX_CAP);
            agg.resilience = (agg.resilience + synergy.resilience).min(INDEX_CAP);
        }
        Scenario::CityBuilder => {
            agg.score = inputs.money;
        }
    }

    agg
}

/// Settle one energy interval into the wallet.
pub fn settle_energy_tick(wallet: &mut Wallet, aggregates: &Aggregates) -> EnergySettlement {
    let settlement = settle_energy(aggregates.production, aggregates.consumption);
    let money = wallet.apply_balance(settlement.balance);
    log::debug!(
        "Energy settlement: served {:.1}, surplus {:.1}, shortfall {:.1}, balance {:+}, money {}",
        settlement.served,
        settlement.surplus,
        settlement.shortfall,
        settlement.balance,
        money
    );
    settlement
}

/// Everything that happened in one industrial turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub breakdown: TurnBreakdown,
    pub money_after: i64,
    pub modifiers_after: IndustrialModifiers,
}

/// One-shot milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Milestone {
    InnovationLeader,
    ResilientPark,
}

impl Milestone {
    pub fn title(self) -> &'static str {
        match self {
            Milestone::InnovationLeader => "Innovation Leader",
            Milestone::ResilientPark => "Resilient Park",
        }
    }
}

/// Turn counter, persistent modifiers and unlocked milestones of an
/// industrial park session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustrialState {
    pub turn: u32,
    pub modifiers: IndustrialModifiers,
    pub last_report: Option<TurnReport>,
    pub milestones: Vec<Milestone>,
}

impl IndustrialState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle a turn from current aggregates, then roll the modifiers
    /// forward from the innovation index.
    pub fn run_turn(&mut self, wallet: &mut Wallet, aggregates: &Aggregates) -> TurnReport {
        let breakdown = settle_turn(&TurnInputs {
            production: aggregates.production,
            waste: aggregates.waste,
            innovation: aggregates.innovation,
            resilience: aggregates.resilience,
            upkeep: aggregates.upkeep,
            production_multiplier: self.modifiers.production_multiplier,
        });
        let money_after = wallet.apply_balance(breakdown.balance);
        self.turn += 1;
        self.modifiers = IndustrialModifiers::from_innovation(aggregates.innovation);

        let report = TurnReport {
            turn: self.turn,
            breakdown,
            money_after,
            modifiers_after: self.modifiers,
        };
        log::info!(
            "Turn {}: income {} + production {} + innovation {} + resilience {} - upkeep {} - waste {} = {:+} (money {})",
            report.turn,
            breakdown.base_income,
            breakdown.production_income,
            breakdown.innovation_bonus,
            breakdown.resilience_bonus,
            breakdown.upkeep,
            breakdown.waste_penalty,
            breakdown.balance,
            money_after
        );
        self.last_report = Some(report);
        report
    }

    /// Unlock milestones the aggregates qualify for. Returns the newly
    /// unlocked ones; each fires at most once per session.
    pub fn check_milestones(&mut self, aggregates: &Aggregates) -> Vec<Milestone> {
        let mut unlocked = Vec::new();
        let candidates = [
            (Milestone::InnovationLeader, aggregates.innovation),
            (Milestone::ResilientPark, aggregates.resilience),
        ];
        for (milestone, value) in candidates {
            if value >= MILESTONE_THRESHOLD && !self.milestones.contains(&milestone) {
                log::info!("Milestone unlocked: {}", milestone.title());
                self.milestones.push(milestone);
                unlocked.push(milestone);
            }
        }
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Cell;
    use retoia_logic::catalog::EntityKind;

    struct World {
        scenario: Scenario,
        grid: GridStore,
        registry: EntityRegistry,
        network: NetworkGraph,
        wallet: Wallet,
    }

    impl World {
        fn new(scenario: Scenario, size: u32, money: i64) -> Self {
            Self {
                scenario,
                grid: GridStore::new(size),
                registry: EntityRegistry::new(),
                network: NetworkGraph::new(),
                wallet: Wallet::new(money),
            }
        }

        fn build(&mut self, kind: EntityKind, x: u32, z: u32) {
            let cell = Cell::new(x, z);
            self.grid.place(cell, kind, false).unwrap();
            self.registry
                .register(&mut self.wallet, kind, cell, 0.0)
                .unwrap();
        }

        fn consumer(&mut self, x: u32, z: u32, demand: u32) {
            let cell = Cell::new(x, z);
            self.grid.place(cell, EntityKind::Consumer, true).unwrap();
            self.network.add_consumer(cell, demand);
        }

        fn aggregates(&mut self, modifiers: IndustrialModifiers) -> Aggregates {
            let inputs = EconomyInputs {
                scenario: self.scenario,
                grid: &self.grid,
                network: &self.network,
                modifiers,
                money: self.wallet.money(),
                now: 0.0,
            };
            recompute_aggregates(&mut self.registry, &inputs)
        }
    }

    #[test]
    fn test_wallet_refuses_overdraft() {
        let mut wallet = Wallet::new(100);
        assert!(wallet.try_spend(100).is_ok());
        assert_eq!(wallet.money(), 0);
        assert_eq!(
            wallet.try_spend(1),
            Err(Rejection::InsufficientFunds {
                cost: 1,
                available: 0
            })
        );
        assert_eq!(wallet.apply_balance(-50), 0);
    }

    #[test]
    fn test_unconnected_producer_uses_full_edge_factor() {
        let mut world = World::new(Scenario::EnergyGrid, 10, 5000);
        world.build(EntityKind::Solar, 2, 2);
        let agg = world.aggregates(IndustrialModifiers::default());
        assert!((agg.production - 50.0).abs() < 1e-4);
        assert_eq!(agg.consumption, 0.0);
        assert_eq!(agg.healthy, 1);
        assert!((agg.average_efficiency - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_connected_producer_pays_line_loss() {
        let mut world = World::new(Scenario::EnergyGrid, 10, 5000);
        world.build(EntityKind::Solar, 2, 2);
        world.consumer(2, 3, 50);
        world
            .network
            .connect(&world.grid, Cell::new(2, 2), Cell::new(2, 3))
            .unwrap();
        let agg = world.aggregates(IndustrialModifiers::default());
        assert!((agg.production - 49.0).abs() < 1e-3);
        assert_eq!(agg.consumption, 50.0);
        assert!((agg.energy_balance + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_health_scales_energy_output() {
        let mut world = World::new(Scenario::EnergyGrid, 10, 5000);
        world.build(EntityKind::Wind, 0, 0);
        world.registry.set_health(Cell::new(0, 0), 50.0);
        let agg = world.aggregates(IndustrialModifiers::default());
        assert!((agg.production - 40.0).abs() < 1e-3);
        assert_eq!(agg.warning, 1);
    }

    #[test]
    fn test_energy_tick_floors_money() {
        let mut wallet = Wallet::new(10);
        let agg = Aggregates {
            production: 0.0,
            consumption: 100.0,
            ..Default::default()
        };
        let settlement = settle_energy_tick(&mut wallet, &agg);
        assert_eq!(settlement.balance, -100);
        assert_eq!(wallet.money(), 0);
    }

    #[test]
    fn test_industrial_aggregates_apply_caps_and_reduction() {
        let mut world = World::new(Scenario::IndustrialPark, 20, 100_000);
        world.build(EntityKind::SmartHub, 0, 0);
        world.build(EntityKind::SmartHub, 10, 10);
        let modifiers = IndustrialModifiers {
            production_multiplier: 1.0,
            waste_reduction: 4.0,
        };
        let agg = world.aggregates(modifiers);
        assert_eq!(agg.production, 60.0);
        assert_eq!(agg.waste, 6.0);
        assert_eq!(agg.innovation, 40.0);
        assert_eq!(agg.resilience, 30.0);
        assert_eq!(agg.upkeep, 240);
    }

    #[test]
    fn test_research_center_synergy() {
        let mut world = World::new(Scenario::IndustrialPark, 20, 100_000);
        world.build(EntityKind::ResearchCenter, 5, 5);
        world.build(EntityKind::CleanFactory, 7, 5);
        let agg = world.aggregates(IndustrialModifiers::default());
        // 15 + 2 own innovation, plus 2 for the factory in range.
        assert_eq!(agg.innovation, 19.0);
    }

    #[test]
    fn test_turn_updates_modifiers_and_money() {
        let mut wallet = Wallet::new(1000);
        let mut state = IndustrialState::new();
        let agg = Aggregates {
            production: 50.0,
            waste: 8.0,
            innovation: 60.0,
            resilience: 10.0,
            upkeep: 50,
            ..Default::default()
        };
        let report = state.run_turn(&mut wallet, &agg);
        // 500 + 500 + 300 - 50
        assert_eq!(report.breakdown.balance, 1250);
        assert_eq!(report.money_after, 2250);
        assert_eq!(report.turn, 1);
        assert!((state.modifiers.production_multiplier - 1.3).abs() < 1e-6);
        assert_eq!(state.modifiers.waste_reduction, 6.0);
    }

    #[test]
    fn test_milestones_fire_once() {
        let mut state = IndustrialState::new();
        let agg = Aggregates {
            innovation: 55.0,
            resilience: 20.0,
            ..Default::default()
        };
        assert_eq!(
            state.check_milestones(&agg),
            vec![Milestone::InnovationLeader]
        );
        assert!(state.check_milestones(&agg).is_empty());
        let agg = Aggregates {
            innovation: 55.0,
            resilience: 50.0,
            ..Default::default()
        };
        assert_eq!(state.check_milestones(&agg), vec![Milestone::ResilientPark]);
    }
}
