//! Components attached to registered entities.

use super::grid::Cell;
use retoia_logic::catalog::EntityKind;
use retoia_logic::maintenance::{self, MaintenanceKind, MAX_HEALTH};
use serde::{Deserialize, Serialize};

/// Engine-wide entity identifier. Never reused within an engine's lifetime,
/// so a stale scheduled event can never match a newer entity on the same
/// cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// What and where an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: EntityId,
    pub kind: EntityKind,
    pub cell: Cell,
}

/// Wear state. Only decay and maintenance completion write to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// 0-100
    pub health: f32,
    /// `health / 100`
    pub efficiency: f32,
    pub last_maintenance_at: f64,
}

impl Condition {
    pub fn new(placed_at: f64) -> Self {
        Self {
            health: MAX_HEALTH,
            efficiency: 1.0,
            last_maintenance_at: placed_at,
        }
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, MAX_HEALTH);
        self.efficiency = maintenance::efficiency_from_health(self.health);
    }
}

/// Present only while a maintenance job is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InMaintenance {
    pub kind: MaintenanceKind,
    pub ends_at: f64,
}

/// Present only while a post-overhaul efficiency bonus is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporaryBonus {
    pub amount: f32,
    pub expires_at: f64,
}

impl TemporaryBonus {
    pub fn is_active(&self, now: f64) -> bool {
        now < self.expires_at
    }
}

/// Read-only copy of an entity handed out by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub cell: Cell,
    pub health: f32,
    pub efficiency: f32,
    pub last_maintenance_at: f64,
    pub maintenance: Option<InMaintenance>,
    pub bonus: Option<TemporaryBonus>,
}

impl EntityView {
    pub fn in_maintenance(&self) -> bool {
        self.maintenance.is_some()
    }

    /// Efficiency including a bonus that is still active at `now`.
    pub fn effective_efficiency(&self, now: f64) -> f32 {
        let bonus = self
            .bonus
            .filter(|b| b.is_active(now))
            .map_or(0.0, |b| b.amount);
        maintenance::effective_efficiency(self.efficiency, bonus)
    }
}
