//! Pure wear and maintenance logic.
//!
//! Health is tracked on a 0-100 scale. Efficiency is `health / 100`, lifted
//! by a temporary bonus after an overhaul but never above
//! [`MAX_EFFICIENCY`].

use serde::{Deserialize, Serialize};

pub const MAX_HEALTH: f32 = 100.0;

/// Ceiling for efficiency including any maintenance bonus.
pub const MAX_EFFICIENCY: f32 = 1.2;

/// Health below which an entity counts as critical.
pub const CRITICAL_HEALTH: f32 = 20.0;

/// Health at or above which an entity counts as healthy.
pub const HEALTHY_HEALTH: f32 = 60.0;

/// Maintenance job types. They differ only in restore amount, price,
/// duration and whether they leave a temporary efficiency bonus behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceKind {
    Inspection,
    Repair,
    Overhaul,
}

/// Efficiency bonus granted on completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusGrant {
    pub amount: f32,
    pub duration_secs: f64,
}

impl MaintenanceKind {
    pub const ALL: [MaintenanceKind; 3] = [
        MaintenanceKind::Inspection,
        MaintenanceKind::Repair,
        MaintenanceKind::Overhaul,
    ];

    /// Health points restored when the job completes.
    pub fn restore_amount(self) -> f32 {
        match self {
            MaintenanceKind::Inspection => 15.0,
            MaintenanceKind::Repair => 40.0,
            MaintenanceKind::Overhaul => 100.0,
        }
    }

    /// Multiplier applied to the entity's upkeep to price the job.
    pub fn cost_multiplier(self) -> i64 {
        match self {
            MaintenanceKind::Inspection => 1,
            MaintenanceKind::Repair => 2,
            MaintenanceKind::Overhaul => 4,
        }
    }

    /// Seconds between acceptance and completion.
    pub fn duration_secs(self) -> f64 {
        match self {
            MaintenanceKind::Inspection => 2.0,
            MaintenanceKind::Repair => 5.0,
            MaintenanceKind::Overhaul => 10.0,
        }
    }

    pub fn bonus(self) -> Option<BonusGrant> {
        match self {
            MaintenanceKind::Overhaul => Some(BonusGrant {
                amount: 0.2,
                duration_secs: 30.0,
            }),
            _ => None,
        }
    }

    pub fn cost_for(self, upkeep: i64) -> i64 {
        upkeep * self.cost_multiplier()
    }
}

/// Coarse condition bands used for the healthy/warning/critical counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    Healthy,
    Warning,
    Critical,
}

impl HealthBand {
    pub fn from_health(health: f32) -> Self {
        if health >= HEALTHY_HEALTH {
            Self::Healthy
        } else if health >= CRITICAL_HEALTH {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

/// Health after `elapsed_secs` of wear at `degradation_rate`.
pub fn decayed_health(health: f32, degradation_rate: f32, elapsed_secs: f32) -> f32 {
    (health - degradation_rate * elapsed_secs * MAX_HEALTH).clamp(0.0, MAX_HEALTH)
}

/// Health after a completed job.
pub fn restored_health(health: f32, kind: MaintenanceKind) -> f32 {
    (health + kind.restore_amount()).min(MAX_HEALTH)
}

/// Base efficiency derived from health.
pub fn efficiency_from_health(health: f32) -> f32 {
    (health / MAX_HEALTH).clamp(0.0, 1.0)
}

/// Efficiency including an active bonus.
pub fn effective_efficiency(efficiency: f32, bonus: f32) -> f32 {
    (efficiency + bonus).clamp(0.0, MAX_EFFICIENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_scales_with_time_and_floors_at_zero() {
        let h = decayed_health(100.0, 0.001, 1.0);
        assert!((h - 99.9).abs() < 1e-4);
        let h = decayed_health(100.0, 0.001, 10.0);
        assert!((h - 99.0).abs() < 1e-4);
        assert_eq!(decayed_health(0.5, 0.01, 10.0), 0.0);
    }

    #[test]
    fn zero_rate_does_not_decay() {
        assert_eq!(decayed_health(73.0, 0.0, 1000.0), 73.0);
    }

    #[test]
    fn restore_caps_at_full_health() {
        assert_eq!(restored_health(50.0, MaintenanceKind::Inspection), 65.0);
        assert_eq!(restored_health(90.0, MaintenanceKind::Repair), 100.0);
        assert_eq!(restored_health(0.0, MaintenanceKind::Overhaul), 100.0);
    }

    #[test]
    fn only_overhaul_grants_bonus() {
        assert!(MaintenanceKind::Inspection.bonus().is_none());
        assert!(MaintenanceKind::Repair.bonus().is_none());
        assert!(MaintenanceKind::Overhaul.bonus().is_some());
    }

    #[test]
    fn effective_efficiency_is_capped() {
        assert!((effective_efficiency(1.0, 0.2) - 1.2).abs() < 1e-6);
        assert!((effective_efficiency(1.0, 0.5) - 1.2).abs() < 1e-6);
        assert!((effective_efficiency(0.5, 0.2) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn health_bands() {
        assert_eq!(HealthBand::from_health(100.0), HealthBand::Healthy);
        assert_eq!(HealthBand::from_health(60.0), HealthBand::Healthy);
        assert_eq!(HealthBand::from_health(59.9), HealthBand::Warning);
        assert_eq!(HealthBand::from_health(20.0), HealthBand::Warning);
        assert_eq!(HealthBand::from_health(19.9), HealthBand::Critical);
        assert_eq!(HealthBand::from_health(0.0), HealthBand::Critical);
    }

    #[test]
    fn pricing_follows_upkeep() {
        assert_eq!(MaintenanceKind::Inspection.cost_for(20), 20);
        assert_eq!(MaintenanceKind::Repair.cost_for(20), 40);
        assert_eq!(MaintenanceKind::Overhaul.cost_for(100), 400);
    }
}
