//! Entity registry - the placed entities that carry gameplay state.
//!
//! Entities live in an ECS world so transient state (a running maintenance
//! job, an active bonus) is simply a component that exists only while it
//! applies. A coordinate index maps each occupied cell to its entity.

use std::collections::HashMap;

use hecs::World;
use retoia_logic::catalog::EntityKind;

use crate::components::*;
use crate::error::Rejection;
use crate::systems::Wallet;

#[derive(Default)]
pub struct EntityRegistry {
    world: World,
    index: HashMap<Cell, hecs::Entity>,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pay for and insert an entity. Nothing changes when the wallet cannot
    /// cover the cost.
    pub fn register(
        &mut self,
        wallet: &mut Wallet,
        kind: EntityKind,
        cell: Cell,
        now: f64,
    ) -> Result<EntityId, Rejection> {
        if self.index.contains_key(&cell) {
            return Err(Rejection::OccupiedCell(cell));
        }
        wallet.try_spend(kind.stats().cost)?;

        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = self
            .world
            .spawn((Placement { id, kind, cell }, Condition::new(now)));
        self.index.insert(cell, entity);
        Ok(id)
    }

    /// Remove and return the entity on `cell`, if any.
    pub fn unregister(&mut self, cell: Cell) -> Option<EntityView> {
        let view = self.find(cell)?;
        if let Some(entity) = self.index.remove(&cell) {
            let _ = self.world.despawn(entity);
        }
        Some(view)
    }

    pub fn find(&self, cell: Cell) -> Option<EntityView> {
        let entity = *self.index.get(&cell)?;
        self.view(entity)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Snapshot of every entity, ordered by id.
    pub fn all(&self) -> Vec<EntityView> {
        let mut views: Vec<EntityView> = self
            .index
            .values()
            .filter_map(|&entity| self.view(entity))
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    fn view(&self, entity: hecs::Entity) -> Option<EntityView> {
        let placement = *self.world.get::<&Placement>(entity).ok()?;
        let condition = *self.world.get::<&Condition>(entity).ok()?;
        let maintenance = self.world.get::<&InMaintenance>(entity).ok().map(|m| *m);
        let bonus = self.world.get::<&TemporaryBonus>(entity).ok().map(|b| *b);
        Some(EntityView {
            id: placement.id,
            kind: placement.kind,
            cell: placement.cell,
            health: condition.health,
            efficiency: condition.efficiency,
            last_maintenance_at: condition.last_maintenance_at,
            maintenance,
            bonus,
        })
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.index.clear();
    }

    // ── Engine-internal writers ──────────────────────────────────────────
    // Health, efficiency, maintenance and bonus state are written only by
    // the decay and maintenance systems.

    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub(crate) fn entity_at(&self, cell: Cell) -> Option<hecs::Entity> {
        self.index.get(&cell).copied()
    }

    pub(crate) fn start_maintenance(&mut self, cell: Cell, job: InMaintenance) -> bool {
        match self.entity_at(cell) {
            Some(entity) => self.world.insert_one(entity, job).is_ok(),
            None => false,
        }
    }

    /// Drop bonuses whose time has passed.
    pub(crate) fn clear_expired_bonuses(&mut self, now: f64) -> usize {
        let expired: Vec<hecs::Entity> = self
            .world
            .query::<&TemporaryBonus>()
            .iter()
            .filter(|(_, bonus)| !bonus.is_active(now))
            .map(|(entity, _)| entity)
            .collect();
        for &entity in &expired {
            let _ = self.world.remove_one::<TemporaryBonus>(entity);
        }
        expired.len()
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, cell: Cell, health: f32) {
        if let Some(entity) = self.entity_at(cell) {
            if let Ok(mut condition) = self.world.get::<&mut Condition>(entity) {
                condition.set_health(health);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_debits_and_indexes() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(1000);
        let cell = Cell::new(2, 2);

        let id = registry
            .register(&mut wallet, EntityKind::Solar, cell, 0.0)
            .unwrap();
        assert_eq!(wallet.money(), 850);

        let view = registry.find(cell).unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.kind, EntityKind::Solar);
        assert_eq!(view.health, 100.0);
        assert_eq!(view.efficiency, 1.0);
        assert!(!view.in_maintenance());
    }

    #[test]
    fn test_register_without_funds_changes_nothing() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(100);
        let result = registry.register(&mut wallet, EntityKind::Nuclear, Cell::new(0, 0), 0.0);
        assert_eq!(
            result,
            Err(Rejection::InsufficientFunds {
                cost: 1200,
                available: 100
            })
        );
        assert_eq!(wallet.money(), 100);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_returns_entity_once() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(1000);
        let cell = Cell::new(1, 3);
        registry
            .register(&mut wallet, EntityKind::Wind, cell, 0.0)
            .unwrap();

        let removed = registry.unregister(cell).unwrap();
        assert_eq!(removed.kind, EntityKind::Wind);
        assert!(registry.unregister(cell).is_none());
        assert!(registry.find(cell).is_none());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(10_000);
        let cell = Cell::new(0, 0);
        let first = registry
            .register(&mut wallet, EntityKind::Solar, cell, 0.0)
            .unwrap();
        registry.unregister(cell);
        registry.clear();
        let second = registry
            .register(&mut wallet, EntityKind::Solar, cell, 0.0)
            .unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(10_000);
        for x in (0..5).rev() {
            registry
                .register(&mut wallet, EntityKind::Solar, Cell::new(x, 0), 0.0)
                .unwrap();
        }
        let ids: Vec<u64> = registry.all().iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_expired_bonus_is_cleared() {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(1000);
        let cell = Cell::new(0, 0);
        registry
            .register(&mut wallet, EntityKind::Solar, cell, 0.0)
            .unwrap();
        let entity = registry.entity_at(cell).unwrap();
        registry
            .world_mut()
            .insert_one(
                entity,
                TemporaryBonus {
                    amount: 0.2,
                    expires_at: 5.0,
                },
            )
            .unwrap();

        assert_eq!(registry.clear_expired_bonuses(4.0), 0);
        assert!(registry.find(cell).unwrap().bonus.is_some());
        assert_eq!(registry.clear_expired_bonuses(5.0), 1);
        assert!(registry.find(cell).unwrap().bonus.is_none());
    }
}
