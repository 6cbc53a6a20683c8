//! # Archetypes
//!
//! Entities with exactly the same set of component types share one
//! [`Archetype`]: a table with one [`ComponentColumn`] per type and a parallel
//! entity list. Attaching `Ready` to a widget moves it to the archetype that
//! includes `Ready`, which is what makes "all `Button`s that are `Ready`" a scan
//! over a handful of tables rather than a per-entity probe.
//!
//! ```text
//! Archetype [Button, Transform, Ready]
//!   Button:    [b0, b1]
//!   Transform: [t0, t1]
//!   Ready:     [r0, r1]
//!   entities:  [e4, e9]
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use super::component::ComponentColumn;
use super::entity::Entity;

/// Sorted, deduplicated component type set identifying an archetype.
pub(crate) type ArchetypeKey = Vec<TypeId>;

pub(crate) fn archetype_key(mut type_ids: Vec<TypeId>) -> ArchetypeKey {
    type_ids.sort();
    type_ids.dedup();
    type_ids
}

pub(crate) struct Archetype {
    pub columns: HashMap<TypeId, ComponentColumn>,
    pub entities: Vec<Entity>,
}

impl Archetype {
    pub fn new(columns: HashMap<TypeId, ComponentColumn>) -> Self {
        Self {
            columns,
            entities: Vec::new(),
        }
    }

    /// Build an empty archetype with one column per type in `key`.
    pub fn for_key(key: &ArchetypeKey) -> Self {
        Self::new(key.iter().map(|&t| (t, ComponentColumn::new())).collect())
    }

    pub fn has_component(&self, type_id: &TypeId) -> bool {
        self.columns.contains_key(type_id)
    }

    pub fn has_all(&self, type_ids: &[TypeId]) -> bool {
        type_ids.iter().all(|tid| self.has_component(tid))
    }

    /// Swap-remove the row at `index`. Returns the entity that moved into the
    /// vacated row, if any, so the caller can fix its location.
    pub fn swap_remove(&mut self, index: usize) -> Option<Entity> {
        for column in self.columns.values_mut() {
            column.swap_remove(index);
        }
        self.entities.swap_remove(index);
        self.entities.get(index).copied()
    }
}
