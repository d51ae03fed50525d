//! Game-over system - samples entity condition and checks loss rules

use retoia_logic::outcome::{check_game_over, GameOverCause, HealthSample};
use serde::{Deserialize, Serialize};

use crate::registry::EntityRegistry;

/// A finished session. The engine stays frozen until reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOver {
    pub cause: GameOverCause,
    pub reason: String,
    /// Simulation time the loss was detected.
    pub at: f64,
}

pub fn health_samples(registry: &EntityRegistry) -> Vec<HealthSample> {
    registry
        .all()
        .into_iter()
        .map(|view| HealthSample {
            kind: view.kind,
            x: view.cell.x,
            z: view.cell.z,
            health: view.health,
            in_maintenance: view.in_maintenance(),
        })
        .collect()
}

pub fn evaluate_game_over(
    registry: &EntityRegistry,
    money: i64,
    energy_balance: f32,
    now: f64,
) -> Option<GameOver> {
    let cause = check_game_over(&health_samples(registry), money, energy_balance)?;
    let reason = cause.reason();
    log::info!("Game over at {:.1}s: {}", now, reason);
    Some(GameOver { cause, reason, at: now })
}
