//! Read-only view of an engine, polled once per frame by a renderer or UI.

use retoia_logic::catalog::{EntityKind, Scenario};
use retoia_logic::economy::EnergySettlement;
use retoia_logic::maintenance::HealthBand;
use retoia_logic::network::is_inefficient;
use serde::Serialize;

use crate::commands::Tool;
use crate::components::*;
use crate::engine::SimulationEngine;
use crate::systems::{Aggregates, GameOver, IndustrialState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub cell: Cell,
    pub health: f32,
    pub efficiency: f32,
    pub effective_efficiency: f32,
    pub band: HealthBand,
    pub maintenance: Option<InMaintenance>,
    pub bonus: Option<TemporaryBonus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSnapshot {
    pub from: Cell,
    pub to: Cell,
    pub distance: u32,
    pub efficiency: f32,
    pub inefficient: bool,
}

/// One anchor cell; footprint shadows are not listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorSnapshot {
    pub cell: Cell,
    pub kind: EntityKind,
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub scenario: Scenario,
    pub sim_time: f64,
    pub grid_size: u32,
    pub money: i64,
    pub aggregates: Aggregates,
    pub entities: Vec<EntitySnapshot>,
    pub consumers: Vec<Consumer>,
    pub lines: Vec<LineSnapshot>,
    pub anchors: Vec<AnchorSnapshot>,
    pub selected_tool: Option<Tool>,
    pub pending_connection: Option<Cell>,
    pub pending_maintenance: usize,
    pub last_settlement: Option<EnergySettlement>,
    /// Industrial park only.
    pub industrial: Option<IndustrialState>,
    pub game_over: Option<GameOver>,
}

impl SimulationEngine {
    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.sim_time;
        let entities = self
            .registry
            .all()
            .into_iter()
            .map(|view| EntitySnapshot {
                id: view.id,
                kind: view.kind,
                cell: view.cell,
                health: view.health,
                efficiency: view.efficiency,
                effective_efficiency: view.effective_efficiency(now),
                band: HealthBand::from_health(view.health),
                maintenance: view.maintenance,
                bonus: view.bonus.filter(|b| b.is_active(now)),
            })
            .collect();
        let lines = self
            .network
            .lines()
            .iter()
            .map(|line| LineSnapshot {
                from: line.from,
                to: line.to,
                distance: line.distance,
                efficiency: line.efficiency,
                inefficient: is_inefficient(line.efficiency),
            })
            .collect();
        let anchors = self
            .grid
            .anchors()
            .map(|(cell, record)| AnchorSnapshot {
                cell,
                kind: record.kind,
                permanent: record.permanent,
            })
            .collect();

        EngineSnapshot {
            scenario: self.config.scenario,
            sim_time: now,
            grid_size: self.grid.size(),
            money: self.wallet.money(),
            aggregates: self.aggregates,
            entities,
            consumers: self.network.consumers().to_vec(),
            lines,
            anchors,
            selected_tool: self.selected_tool,
            pending_connection: self.pending_connection,
            pending_maintenance: self.maintenance_queue.len(),
            last_settlement: self.last_settlement,
            industrial: (self.config.scenario == Scenario::IndustrialPark)
                .then(|| self.industrial.clone()),
            game_over: self.game_over.clone(),
        }
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}
