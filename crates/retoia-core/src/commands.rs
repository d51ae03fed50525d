//! Command surface - the discrete actions an input layer can issue.
//!
//! Every command validates before it mutates, so a rejection leaves the
//! grid, registry, network and money exactly as they were. Rejections are
//! normal misclicks and are only logged at debug level.

use retoia_logic::catalog::{EntityKind, Scenario};
use retoia_logic::maintenance::MaintenanceKind;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::engine::SimulationEngine;
use crate::error::Rejection;
use crate::systems::{perform_maintenance, ScheduledCompletion};

/// What a click does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Build(EntityKind),
    Eraser,
    Connect,
    Maintain(MaintenanceKind),
}

/// What a successful command did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CommandOutcome {
    Placed {
        kind: EntityKind,
        cell: Cell,
        /// Registry id; decorative kinds have none.
        id: Option<EntityId>,
        replaced: Option<EntityKind>,
    },
    Removed {
        kind: EntityKind,
        cell: Cell,
        /// Signed money change: a refund, or forfeited city points.
        money_delta: i64,
    },
    ConnectionStarted(Cell),
    ConnectionCancelled(Cell),
    Connected(PowerLine),
    MaintenanceStarted(ScheduledCompletion),
}

/// A keyboard shortcut after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Select(Tool),
    ClearSelection,
}

/// Map a key name to a command. Digits pick from the scenario palette;
/// keys without a binding resolve to `None`.
pub fn resolve_key(scenario: Scenario, key: &str) -> Option<KeyCommand> {
    match key {
        "Delete" | "Backspace" => Some(KeyCommand::Select(Tool::Eraser)),
        "Escape" => Some(KeyCommand::ClearSelection),
        digit => {
            let n: usize = digit.parse().ok()?;
            let index = n.checked_sub(1)?;
            scenario
                .palette()
                .get(index)
                .map(|&kind| KeyCommand::Select(Tool::Build(kind)))
        }
    }
}

fn rejected<T>(command: &str, rejection: Rejection) -> Result<T, Rejection> {
    log::debug!("{} rejected: {}", command, rejection);
    Err(rejection)
}

impl SimulationEngine {
    /// Select a tool. Selecting the current tool again deselects it.
    pub fn select_tool(&mut self, tool: Tool) -> Option<Tool> {
        let next = if self.selected_tool == Some(tool) {
            None
        } else {
            Some(tool)
        };
        self.set_tool(next);
        next
    }

    pub fn clear_tool(&mut self) {
        self.set_tool(None);
    }

    pub fn selected_tool(&self) -> Option<Tool> {
        self.selected_tool
    }

    pub fn pending_connection(&self) -> Option<Cell> {
        self.pending_connection
    }

    fn set_tool(&mut self, tool: Option<Tool>) {
        if tool != Some(Tool::Connect) {
            self.pending_connection = None;
        }
        self.selected_tool = tool;
    }

    /// Apply a keyboard shortcut. Keys always select; they never toggle.
    pub fn handle_key(&mut self, key: &str) -> Option<KeyCommand> {
        let command = resolve_key(self.config.scenario, key)?;
        match command {
            KeyCommand::Select(tool) => self.set_tool(Some(tool)),
            KeyCommand::ClearSelection => self.set_tool(None),
        }
        Some(command)
    }

    /// Run whatever the selected tool does on a cell.
    pub fn click_at(&mut self, x: u32, z: u32) -> Result<CommandOutcome, Rejection> {
        match self.selected_tool {
            None => rejected("click", Rejection::NoToolSelected),
            Some(Tool::Build(_)) => self.place_at(x, z),
            Some(Tool::Eraser) => self.remove_at(x, z),
            Some(Tool::Connect) => self.connect_at(x, z),
            Some(Tool::Maintain(kind)) => self.maintain_at(x, z, kind),
        }
    }

    /// Build the selected kind on a cell.
    pub fn place_at(&mut self, x: u32, z: u32) -> Result<CommandOutcome, Rejection> {
        let cell = Cell::new(x, z);
        match self.try_place(cell) {
            Ok(outcome) => Ok(outcome),
            Err(rejection) => rejected("place", rejection),
        }
    }

    fn try_place(&mut self, cell: Cell) -> Result<CommandOutcome, Rejection> {
        self.ensure_running()?;
        let Some(Tool::Build(kind)) = self.selected_tool else {
            return Err(Rejection::NoToolSelected);
        };
        if !self.config.scenario.allows(kind) {
            return Err(Rejection::UnavailableInScenario(kind));
        }
        let replaced = self.grid.check_placeable(cell)?;

        let stats = kind.stats();
        let id = if kind.is_registered() {
            Some(
                self.registry
                    .register(&mut self.wallet, kind, cell, self.sim_time)?,
            )
        } else {
            self.wallet.try_spend(stats.cost)?;
            None
        };
        self.grid.place(cell, kind, false)?;
        if self.config.scenario == Scenario::CityBuilder {
            self.wallet.credit(stats.points);
        }
        self.recompute();

        log::info!(
            "Placed {} at {} (money {})",
            kind.name(),
            cell,
            self.wallet.money()
        );
        Ok(CommandOutcome::Placed {
            kind,
            cell,
            id,
            replaced: replaced.map(|r| r.kind),
        })
    }

    /// Remove whatever occupies a cell. Shadow cells act on their anchor.
    pub fn remove_at(&mut self, x: u32, z: u32) -> Result<CommandOutcome, Rejection> {
        let cell = Cell::new(x, z);
        match self.try_remove(cell) {
            Ok(outcome) => Ok(outcome),
            Err(rejection) => rejected("remove", rejection),
        }
    }

    fn try_remove(&mut self, cell: Cell) -> Result<CommandOutcome, Rejection> {
        self.ensure_running()?;
        let record = self.grid.remove(cell)?;
        let anchor = record.anchor;
        self.registry.unregister(anchor);

        let stats = record.kind.stats();
        let before = self.wallet.money();
        match self.config.scenario {
            Scenario::CityBuilder => {
                self.wallet.apply_balance(-(stats.points / 2));
            }
            Scenario::EnergyGrid | Scenario::IndustrialPark => {
                let refund = (stats.cost as f64 * self.config.refund_fraction).floor() as i64;
                self.wallet.credit(refund);
            }
        }
        let money_delta = self.wallet.money() - before;
        self.recompute();

        log::info!(
            "Removed {} at {} ({:+} money)",
            record.kind.name(),
            anchor,
            money_delta
        );
        Ok(CommandOutcome::Removed {
            kind: record.kind,
            cell: anchor,
            money_delta,
        })
    }

    /// One click of the two-click connect gesture.
    pub fn connect_at(&mut self, x: u32, z: u32) -> Result<CommandOutcome, Rejection> {
        let cell = Cell::new(x, z);
        match self.try_connect(cell) {
            Ok(outcome) => Ok(outcome),
            Err(rejection) => rejected("connect", rejection),
        }
    }

    fn try_connect(&mut self, cell: Cell) -> Result<CommandOutcome, Rejection> {
        self.ensure_running()?;
        if !self.grid.in_bounds(cell) {
            return Err(Rejection::OutOfBounds(cell));
        }
        if !self.grid.is_occupied(cell) {
            return Err(Rejection::NoEntityAtEndpoint(cell));
        }

        match self.pending_connection {
            None => {
                self.pending_connection = Some(cell);
                Ok(CommandOutcome::ConnectionStarted(cell))
            }
            Some(pending) if pending == cell => {
                self.pending_connection = None;
                Ok(CommandOutcome::ConnectionCancelled(cell))
            }
            Some(pending) => {
                let line = self.network.connect(&self.grid, pending, cell)?;
                self.pending_connection = None;
                self.recompute();
                log::info!(
                    "Line {} -> {}: distance {}, efficiency {:.0}%",
                    line.from,
                    line.to,
                    line.distance,
                    line.efficiency * 100.0
                );
                Ok(CommandOutcome::Connected(line))
            }
        }
    }

    /// Start a maintenance job on the entity at a cell.
    pub fn maintain_at(
        &mut self,
        x: u32,
        z: u32,
        kind: MaintenanceKind,
    ) -> Result<CommandOutcome, Rejection> {
        let cell = Cell::new(x, z);
        let result = self.ensure_running().and_then(|()| {
            perform_maintenance(
                &mut self.registry,
                &mut self.wallet,
                &mut self.maintenance_queue,
                cell,
                kind,
                self.sim_time,
            )
        });
        match result {
            Ok(completion) => {
                self.recompute();
                Ok(CommandOutcome::MaintenanceStarted(completion))
            }
            Err(rejection) => rejected("maintain", rejection),
        }
    }
}
