//! # Readiness
//!
//! An entity whose data is fully populated carries the zero-sized [`Ready`]
//! marker. Nothing else signals readiness: loaders attach it when decoding
//! finishes, the widget factory attaches it when a widget is assembled, and
//! every construction step checks it on its inputs before consuming them.
//!
//! `Ready` is added at most once and never removed; only despawning the entity
//! takes it away.

use crate::ecs::{Entity, World};

/// "This entity's data is safe to consume."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ready;

/// `true` if `entity` is alive and carries [`Ready`].
pub fn is_ready(world: &World, entity: Entity) -> bool {
    world.has::<Ready>(entity)
}

/// `true` if every entity in `entities` is ready. Vacuously true when empty.
pub fn all_ready(world: &World, entities: &[Entity]) -> bool {
    entities.iter().all(|&e| is_ready(world, e))
}

/// Attach [`Ready`] to `entity`. Already-ready and dead entities are left alone.
pub fn mark_ready(world: &mut World, entity: Entity) {
    if world.is_alive(entity) && !is_ready(world, entity) {
        world.insert(entity, Ready);
    }
}
