//! Maintenance system - timed service jobs and their scheduled completion

use retoia_logic::maintenance::{restored_health, MaintenanceKind};
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::error::Rejection;
use crate::registry::EntityRegistry;
use crate::systems::Wallet;

/// A completion waiting for the clock to reach `due_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCompletion {
    pub entity_id: EntityId,
    pub cell: Cell,
    pub kind: MaintenanceKind,
    pub due_at: f64,
}

/// Pending maintenance completions (singleton, stored in engine)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceQueue {
    pub scheduled: Vec<ScheduledCompletion>,
}

impl MaintenanceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, completion: ScheduledCompletion) {
        self.scheduled.push(completion);
    }

    /// Remove and return every completion due by `now`, earliest first.
    /// Completions due at the same time keep their scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledCompletion> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|c| c.due_at <= now);
        self.scheduled = pending;
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}

/// Start a maintenance job on the entity at `cell`.
///
/// The job is paid for up front. Health is restored only when the
/// scheduled completion fires.
pub fn perform_maintenance(
    registry: &mut EntityRegistry,
    wallet: &mut Wallet,
    queue: &mut MaintenanceQueue,
    cell: Cell,
    kind: MaintenanceKind,
    now: f64,
) -> Result<ScheduledCompletion, Rejection> {
    let view = registry.find(cell).ok_or(Rejection::Empty(cell))?;
    if view.in_maintenance() {
        return Err(Rejection::AlreadyInMaintenance(cell));
    }
    let cost = kind.cost_for(view.kind.stats().upkeep);
    wallet.try_spend(cost)?;

    let due_at = now + kind.duration_secs();
    registry.start_maintenance(
        cell,
        InMaintenance {
            kind,
            ends_at: due_at,
        },
    );
    let completion = ScheduledCompletion {
        entity_id: view.id,
        cell,
        kind,
        due_at,
    };
    queue.schedule(completion);
    log::info!(
        "{:?} started on {} at {} for {} (due at {:.1}s)",
        kind,
        view.kind.name(),
        cell,
        cost,
        due_at
    );
    Ok(completion)
}

/// Apply a due completion.
///
/// Silently does nothing if the entity it was scheduled for no longer
/// occupies the cell or is no longer under maintenance.
pub fn complete_maintenance(
    registry: &mut EntityRegistry,
    due: &ScheduledCompletion,
) -> Option<EntityView> {
    let entity = registry.entity_at(due.cell)?;
    let world = registry.world_mut();

    let same_entity = world
        .get::<&Placement>(entity)
        .map(|p| p.id == due.entity_id)
        .unwrap_or(false);
    if !same_entity {
        return None;
    }
    let job = world.remove_one::<InMaintenance>(entity).ok()?;

    if let Ok(mut condition) = world.get::<&mut Condition>(entity) {
        let restored = restored_health(condition.health, job.kind);
        condition.set_health(restored);
        condition.last_maintenance_at = due.due_at;
    }
    if let Some(grant) = job.kind.bonus() {
        let _ = world.insert_one(
            entity,
            TemporaryBonus {
                amount: grant.amount,
                expires_at: due.due_at + grant.duration_secs,
            },
        );
    }

    let view = registry.find(due.cell)?;
    log::info!(
        "{:?} finished on {} at {}: health {:.1}",
        job.kind,
        view.kind.name(),
        due.cell,
        view.health
    );
    Some(view)
}

/// Fire every completion due by `now`. Returns the entities that changed.
pub fn progress_maintenance(
    registry: &mut EntityRegistry,
    queue: &mut MaintenanceQueue,
    now: f64,
) -> Vec<EntityView> {
    queue
        .drain_due(now)
        .iter()
        .filter_map(|due| complete_maintenance(registry, due))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retoia_logic::catalog::EntityKind;

    fn setup(kind: EntityKind, money: i64) -> (EntityRegistry, Wallet, MaintenanceQueue, Cell) {
        let mut registry = EntityRegistry::new();
        let mut wallet = Wallet::new(money);
        let cell = Cell::new(4, 4);
        registry.register(&mut wallet, kind, cell, 0.0).unwrap();
        (registry, wallet, MaintenanceQueue::new(), cell)
    }

    #[test]
    fn test_maintenance_debits_and_schedules() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Solar, 1000);
        let completion = perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Repair,
            10.0,
        )
        .unwrap();
        // 1000 - 150 build - 20 upkeep x 2
        assert_eq!(wallet.money(), 810);
        assert_eq!(completion.due_at, 15.0);
        assert_eq!(queue.len(), 1);
        assert!(registry.find(cell).unwrap().in_maintenance());
    }

    #[test]
    fn test_second_request_is_rejected_and_schedules_nothing() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Solar, 1000);
        perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Inspection,
            0.0,
        )
        .unwrap();
        let money = wallet.money();
        let again = perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Overhaul,
            1.0,
        );
        assert_eq!(again, Err(Rejection::AlreadyInMaintenance(cell)));
        assert_eq!(wallet.money(), money);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_empty_cell_and_insufficient_funds() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Nuclear, 1250);
        let elsewhere = Cell::new(0, 0);
        assert_eq!(
            perform_maintenance(
                &mut registry,
                &mut wallet,
                &mut queue,
                elsewhere,
                MaintenanceKind::Inspection,
                0.0
            ),
            Err(Rejection::Empty(elsewhere))
        );
        assert_eq!(
            perform_maintenance(
                &mut registry,
                &mut wallet,
                &mut queue,
                cell,
                MaintenanceKind::Overhaul,
                0.0
            ),
            Err(Rejection::InsufficientFunds {
                cost: 400,
                available: 50
            })
        );
        assert!(!registry.find(cell).unwrap().in_maintenance());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_completion_restores_once() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Solar, 1000);
        registry.set_health(cell, 50.0);
        perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Repair,
            0.0,
        )
        .unwrap();

        assert!(progress_maintenance(&mut registry, &mut queue, 4.9).is_empty());
        let done = progress_maintenance(&mut registry, &mut queue, 5.0);
        assert_eq!(done.len(), 1);
        let view = registry.find(cell).unwrap();
        assert!((view.health - 90.0).abs() < 1e-4);
        assert!((view.efficiency - 0.9).abs() < 1e-5);
        assert_eq!(view.last_maintenance_at, 5.0);
        assert!(!view.in_maintenance());
        assert!(progress_maintenance(&mut registry, &mut queue, 100.0).is_empty());
    }

    #[test]
    fn test_overhaul_grants_bonus() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Wind, 5000);
        registry.set_health(cell, 30.0);
        perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Overhaul,
            0.0,
        )
        .unwrap();
        progress_maintenance(&mut registry, &mut queue, 10.0);

        let view = registry.find(cell).unwrap();
        assert_eq!(view.health, 100.0);
        let bonus = view.bonus.unwrap();
        assert_eq!(bonus.expires_at, 40.0);
        assert!((view.effective_efficiency(20.0) - 1.2).abs() < 1e-6);
        assert!((view.effective_efficiency(40.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_completion_after_removal_is_noop() {
        let (mut registry, mut wallet, mut queue, cell) = setup(EntityKind::Solar, 1000);
        perform_maintenance(
            &mut registry,
            &mut wallet,
            &mut queue,
            cell,
            MaintenanceKind::Inspection,
            0.0,
        )
        .unwrap();
        registry.unregister(cell);
        registry
            .register(&mut wallet, EntityKind::Solar, cell, 1.0)
            .unwrap();
        registry.set_health(cell, 40.0);

        assert!(progress_maintenance(&mut registry, &mut queue, 2.0).is_empty());
        assert_eq!(registry.find(cell).unwrap().health, 40.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_orders_by_due_time() {
        let mut queue = MaintenanceQueue::new();
        for (id, due_at) in [(0, 5.0), (1, 2.0), (2, 9.0), (3, 2.0)] {
            queue.schedule(ScheduledCompletion {
                entity_id: EntityId(id),
                cell: Cell::new(0, 0),
                kind: MaintenanceKind::Inspection,
                due_at,
            });
        }
        let due: Vec<u64> = queue.drain_due(6.0).iter().map(|c| c.entity_id.0).collect();
        assert_eq!(due, vec![1, 3, 0]);
        assert_eq!(queue.len(), 1);
    }
}
