//! Decay system - wear on placed entities

use retoia_logic::maintenance::decayed_health;

use crate::components::{Condition, InMaintenance, Placement};
use crate::registry::EntityRegistry;

/// Wear every entity by `elapsed_secs` of its kind's degradation rate.
/// Entities under maintenance are left alone. Returns how many changed.
pub fn decay_system(registry: &mut EntityRegistry, elapsed_secs: f32) -> usize {
    let mut decayed = 0;
    for (_, (placement, condition, maintenance)) in registry
        .world_mut()
        .query_mut::<(&Placement, &mut Condition, Option<&InMaintenance>)>()
    {
        if maintenance.is_some() {
            continue;
        }
        let rate = placement.kind.stats().degradation_rate;
        if rate <= 0.0 || condition.health <= 0.0 {
            continue;
        }
        condition.set_health(decayed_health(condition.health, rate, elapsed_secs));
        decayed += 1;
    }
    decayed
}
