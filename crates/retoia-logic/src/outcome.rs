//! Game-over determination for the energy grid.
//!
//! Conditions are checked in a fixed priority order and the first match
//! wins. The order and thresholds define the difficulty curve.

use serde::{Deserialize, Serialize};

use crate::catalog::EntityKind;
use crate::maintenance::CRITICAL_HEALTH;

/// Energy balance below which an empty treasury ends the game.
pub const BANKRUPTCY_BALANCE_THRESHOLD: f32 = -100.0;

/// Condition of one placed entity as seen by the loss check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSample {
    pub kind: EntityKind,
    pub x: u32,
    pub z: u32,
    pub health: f32,
    pub in_maintenance: bool,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// A source wore down to nothing.
    SourceFailed { kind: EntityKind, x: u32, z: u32 },
    /// No money left while the grid runs a deep deficit.
    Bankrupt { money: i64, energy_balance: f32 },
    /// Every source is critical and none is being serviced.
    AllCritical { count: usize },
}

impl GameOverCause {
    pub fn reason(&self) -> String {
        match self {
            GameOverCause::SourceFailed { kind, x, z } => {
                format!("{} at ({}, {}) has failed completely", kind.name(), x, z)
            }
            GameOverCause::Bankrupt {
                money,
                energy_balance,
            } => format!(
                "Bankrupt: money {} with an energy balance of {:.1}",
                money, energy_balance
            ),
            GameOverCause::AllCritical { count } => {
                format!("All {} sources are critical and none is under maintenance", count)
            }
        }
    }
}

/// Check loss conditions in priority order.
pub fn check_game_over(
    samples: &[HealthSample],
    money: i64,
    energy_balance: f32,
) -> Option<GameOverCause> {
    if let Some(failed) = samples.iter().find(|s| s.health <= 0.0) {
        return Some(GameOverCause::SourceFailed {
            kind: failed.kind,
            x: failed.x,
            z: failed.z,
        });
    }

    if money <= 0 && energy_balance < BANKRUPTCY_BALANCE_THRESHOLD {
        return Some(GameOverCause::Bankrupt {
            money,
            energy_balance,
        });
    }

    let all_critical = !samples.is_empty()
        && samples
            .iter()
            .all(|s| s.health < CRITICAL_HEALTH && !s.in_maintenance);
    if all_critical {
        return Some(GameOverCause::AllCritical {
            count: samples.len(),
        });
    }

    None
}
