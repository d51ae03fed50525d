//! Simulation engine - main entry point for running a scenario session

use retoia_logic::catalog::{EntityKind, Scenario};
use retoia_logic::economy::EnergySettlement;

use crate::commands::Tool;
use crate::components::*;
use crate::error::{ConfigError, Rejection};
use crate::grid::GridStore;
use crate::network::NetworkGraph;
use crate::registry::EntityRegistry;
use crate::scenario::{seed_world, ScenarioConfig};
use crate::systems::*;

/// Most settlements or turns a single `update` will pay out. Anything
/// beyond is dropped.
pub const MAX_CATCH_UP_STEPS: u32 = 1000;

/// Count whole intervals elapsed since `last` and move `last` forward by
/// that many.
fn due_steps(last: &mut f64, now: f64, interval: f64) -> u32 {
    let elapsed = now - *last;
    if elapsed < interval {
        return 0;
    }
    let steps = (elapsed / interval).floor();
    if steps > MAX_CATCH_UP_STEPS as f64 {
        log::warn!(
            "Dropping {} intervals after a long update",
            steps - MAX_CATCH_UP_STEPS as f64
        );
        *last = now;
        return MAX_CATCH_UP_STEPS;
    }
    *last += steps * interval;
    steps as u32
}

/// Main simulation engine. Owns every store of one scenario session.
pub struct SimulationEngine {
    pub(crate) config: ScenarioConfig,
    pub(crate) grid: GridStore,
    pub(crate) registry: EntityRegistry,
    pub(crate) network: NetworkGraph,
    pub(crate) wallet: Wallet,
    /// Scheduled maintenance completions. Survives reset; stale entries
    /// no-op when they fire.
    pub(crate) maintenance_queue: MaintenanceQueue,
    pub(crate) industrial: IndustrialState,
    pub(crate) aggregates: Aggregates,
    pub(crate) last_settlement: Option<EnergySettlement>,
    pub(crate) selected_tool: Option<Tool>,
    pub(crate) pending_connection: Option<Cell>,
    pub(crate) game_over: Option<GameOver>,
    /// Simulation time in seconds since construction. Never rewinds.
    pub(crate) sim_time: f64,

    // Update timing
    last_decay_update: f64,
    last_settlement_update: f64,
    last_turn_update: f64,

    // Configuration
    time_scale: f32,
}

impl SimulationEngine {
    /// Create a session and seed its permanent content.
    pub fn new(config: ScenarioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            grid: GridStore::new(config.grid_size),
            registry: EntityRegistry::new(),
            network: NetworkGraph::new(),
            wallet: Wallet::new(config.starting_money),
            maintenance_queue: MaintenanceQueue::new(),
            industrial: IndustrialState::new(),
            aggregates: Aggregates::default(),
            last_settlement: None,
            selected_tool: None,
            pending_connection: None,
            game_over: None,
            sim_time: 0.0,
            last_decay_update: 0.0,
            last_settlement_update: 0.0,
            last_turn_update: 0.0,
            time_scale: 1.0,
            config,
        };
        seed_world(&engine.config, &mut engine.grid, &mut engine.network);
        engine.recompute();
        log::info!(
            "{:?} session started: {}x{} grid, {} money",
            engine.config.scenario,
            engine.config.grid_size,
            engine.config.grid_size,
            engine.wallet.money()
        );
        Ok(engine)
    }

    /// Session with the scenario's default configuration.
    pub fn for_scenario(scenario: Scenario) -> Result<Self, ConfigError> {
        Self::new(ScenarioConfig::for_scenario(scenario))
    }

    /// Advance the simulation by `delta_seconds` of wall time.
    ///
    /// Every settlement or turn interval the step covers is paid out, up to
    /// `MAX_CATCH_UP_STEPS` per call. Decay and maintenance run once per
    /// call over the whole elapsed time.
    pub fn update(&mut self, delta_seconds: f32) {
        if self.game_over.is_some() {
            return;
        }
        let scaled_delta = (delta_seconds * self.time_scale).max(0.0);
        self.sim_time += scaled_delta as f64;
        let intervals = self.config.intervals;
        let scenario = self.config.scenario;

        // Deferred maintenance completions, in due order
        progress_maintenance(
            &mut self.registry,
            &mut self.maintenance_queue,
            self.sim_time,
        );

        // Wear (every decay interval)
        if scenario.has_decay() && self.sim_time - self.last_decay_update >= intervals.decay_secs
        {
            let elapsed = (self.sim_time - self.last_decay_update) as f32;
            decay_system(&mut self.registry, elapsed);
            self.last_decay_update = self.sim_time;
        }

        self.recompute();

        match scenario {
            Scenario::EnergyGrid => {
                let due = due_steps(
                    &mut self.last_settlement_update,
                    self.sim_time,
                    intervals.settlement_secs,
                );
                for _ in 0..due {
                    self.last_settlement =
                        Some(settle_energy_tick(&mut self.wallet, &self.aggregates));
                }
            }
            Scenario::IndustrialPark => {
                let due = due_steps(&mut self.last_turn_update, self.sim_time, intervals.turn_secs);
                for _ in 0..due {
                    self.run_turn();
                }
            }
            Scenario::CityBuilder => {}
        }

        if scenario.has_decay() {
            self.game_over = evaluate_game_over(
                &self.registry,
                self.wallet.money(),
                self.aggregates.energy_balance,
                self.sim_time,
            );
        }
    }

    /// End the current industrial turn now. `None` outside the industrial
    /// park or once the session is over.
    pub fn advance_turn(&mut self) -> Option<TurnReport> {
        if self.config.scenario != Scenario::IndustrialPark || self.game_over.is_some() {
            return None;
        }
        self.recompute();
        self.last_turn_update = self.sim_time;
        Some(self.run_turn())
    }

    fn run_turn(&mut self) -> TurnReport {
        let report = self.industrial.run_turn(&mut self.wallet, &self.aggregates);
        self.recompute();
        report
    }

    /// Clear everything the player did and re-seed permanent content.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.network.clear();
        self.grid.clear();
        seed_world(&self.config, &mut self.grid, &mut self.network);

        self.wallet.reset(self.config.starting_money);
        self.industrial = IndustrialState::new();
        self.last_settlement = None;
        self.selected_tool = None;
        self.pending_connection = None;
        self.game_over = None;
        self.last_decay_update = self.sim_time;
        self.last_settlement_update = self.sim_time;
        self.last_turn_update = self.sim_time;
        self.recompute();
        log::info!(
            "{:?} session reset ({} money)",
            self.config.scenario,
            self.wallet.money()
        );
    }

    /// Place a permanent consumer at a fixed cell.
    pub fn seed_consumer(&mut self, cell: Cell, demand: u32) -> Result<(), Rejection> {
        self.ensure_running()?;
        self.grid.place(cell, EntityKind::Consumer, true)?;
        self.network.add_consumer(cell, demand);
        self.recompute();
        Ok(())
    }

    pub(crate) fn ensure_running(&self) -> Result<(), Rejection> {
        match self.game_over {
            Some(_) => Err(Rejection::Frozen),
            None => Ok(()),
        }
    }

    /// Rebuild aggregates from the stores.
    pub(crate) fn recompute(&mut self) {
        let inputs = EconomyInputs {
            scenario: self.config.scenario,
            grid: &self.grid,
            network: &self.network,
            modifiers: self.industrial.modifiers,
            money: self.wallet.money(),
            now: self.sim_time,
        };
        self.aggregates = recompute_aggregates(&mut self.registry, &inputs);
        if self.config.scenario == Scenario::IndustrialPark {
            self.industrial.check_milestones(&self.aggregates);
        }
    }

    /// Set time scale (1.0 = real-time, 10.0 = 10x speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulation time in seconds
    pub fn now(&self) -> f64 {
        self.sim_time
    }

    pub fn scenario(&self) -> Scenario {
        self.config.scenario
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn money(&self) -> i64 {
        self.wallet.money()
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn game_over(&self) -> Option<&GameOver> {
        self.game_over.as_ref()
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn network(&self) -> &NetworkGraph {
        &self.network
    }

    pub fn industrial(&self) -> &IndustrialState {
        &self.industrial
    }

    pub fn pending_maintenance(&self) -> usize {
        self.maintenance_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retoia_logic::outcome::GameOverCause;

    fn energy_engine() -> SimulationEngine {
        let mut config = ScenarioConfig::for_scenario(Scenario::EnergyGrid).with_seed(1);
        config.consumer_count = 0;
        SimulationEngine::new(config).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::for_scenario(Scenario::EnergyGrid).unwrap();
        assert_eq!(engine.money(), 5000);
        assert_eq!(engine.network().consumers().len(), 4);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.now(), 0.0);
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = ScenarioConfig::for_scenario(Scenario::CityBuilder);
        config.grid_size = 0;
        assert!(matches!(
            SimulationEngine::new(config),
            Err(ConfigError::EmptyGrid)
        ));
    }

    #[test]
    fn test_time_scale() {
        let mut engine = energy_engine();
        engine.set_time_scale(10.0);
        engine.update(1.0);
        assert!((engine.now() - 10.0).abs() < 1e-9);

        engine.set_time_scale(-3.0);
        assert_eq!(engine.time_scale(), 0.0);
        engine.update(1.0);
        assert!((engine.now() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_settles_on_interval() {
        let mut engine = energy_engine();
        engine.select_tool(Tool::Build(EntityKind::Solar));
        engine.place_at(0, 0).unwrap();
        assert_eq!(engine.money(), 4850);

        engine.update(2.0);
        assert_eq!(engine.money(), 4850);
        engine.update(1.0);
        // 50 surplus x 0.1, slightly less after three seconds of wear.
        assert_eq!(engine.money(), 4854);
    }

    #[test]
    fn test_long_update_pays_every_settlement() {
        let mut engine = energy_engine();
        engine.select_tool(Tool::Build(EntityKind::Solar));
        engine.place_at(0, 0).unwrap();

        // ten ticks of floor(48.5 x 0.1) once the panel has worn to 97
        engine.update(30.0);
        assert_eq!(engine.money(), 4890);

        let mut park = SimulationEngine::for_scenario(Scenario::IndustrialPark).unwrap();
        park.update(120.0);
        assert_eq!(park.industrial().turn, 3);
        assert_eq!(park.money(), 16500);
        park.update(39.0);
        assert_eq!(park.industrial().turn, 3);
        park.update(1.0);
        assert_eq!(park.industrial().turn, 4);
    }

    #[test]
    fn test_due_steps_caps_catch_up() {
        let mut last = 0.0;
        assert_eq!(due_steps(&mut last, 2.9, 3.0), 0);
        assert_eq!(due_steps(&mut last, 7.0, 3.0), 2);
        assert_eq!(last, 6.0);
        assert_eq!(due_steps(&mut last, 1.0e9, 3.0), MAX_CATCH_UP_STEPS);
        assert_eq!(last, 1.0e9);
    }

    #[test]
    fn test_seed_consumer_rejects_occupied_cell() {
        let mut engine = energy_engine();
        engine.seed_consumer(Cell::new(1, 1), 30).unwrap();
        assert_eq!(
            engine.seed_consumer(Cell::new(1, 1), 30),
            Err(Rejection::OccupiedCell(Cell::new(1, 1)))
        );
        assert_eq!(engine.network().consumers().len(), 1);
    }

    #[test]
    fn test_advance_turn_only_in_industrial_park() {
        let mut engine = energy_engine();
        assert!(engine.advance_turn().is_none());

        let mut park = SimulationEngine::for_scenario(Scenario::IndustrialPark).unwrap();
        let report = park.advance_turn().unwrap();
        assert_eq!(report.turn, 1);
        assert_eq!(report.breakdown.balance, 500);
        assert_eq!(park.money(), 15500);
    }

    #[test]
    fn test_frozen_engine_ignores_update() {
        let mut engine = energy_engine();
        engine.select_tool(Tool::Build(EntityKind::Solar));
        engine.place_at(0, 0).unwrap();
        engine.update(1000.0);
        // a thousand seconds at 0.001 per second wears the panel to exactly 0
        assert_eq!(
            engine.game_over().map(|g| g.cause),
            Some(GameOverCause::SourceFailed {
                kind: EntityKind::Solar,
                x: 0,
                z: 0
            })
        );

        let frozen_at = engine.now();
        engine.update(50.0);
        assert_eq!(engine.now(), frozen_at);
        assert_eq!(engine.place_at(1, 1), Err(Rejection::Frozen));
    }
}
