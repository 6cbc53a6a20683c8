//! Load queues.
//!
//! One map per widget kind from a widget entity to the prerequisite entities
//! it still waits on. An entry exists from the factory call until the tick the
//! widget is finalized; a finalized widget is recognized by its `Ready`
//! marker, not by the queues.

use std::collections::HashMap;

use crate::ecs::Entity;

/// A label waits on its glyph table and its glyph sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelEntry {
    pub table: Entity,
    pub sprite: Entity,
}

/// A button waits on its label and its base sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEntry {
    pub label: Entity,
    pub sprite: Entity,
}

/// A checkbox waits on its sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxEntry {
    pub sprite: Entity,
}

#[derive(Debug, Default)]
pub struct LoadQueues {
    pub labels: HashMap<Entity, LabelEntry>,
    pub buttons: HashMap<Entity, ButtonEntry>,
    pub checkboxes: HashMap<Entity, CheckboxEntry>,
}

impl LoadQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total pending entries across all kinds.
    pub fn len(&self) -> usize {
        self.labels.len() + self.buttons.len() + self.checkboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if `widget` is waiting in any queue.
    pub fn contains(&self, widget: Entity) -> bool {
        self.labels.contains_key(&widget)
            || self.buttons.contains_key(&widget)
            || self.checkboxes.contains_key(&widget)
    }

    /// Sorted keys of a queue, so a tick walks widgets in a stable order.
    pub(crate) fn sorted_keys<V>(queue: &HashMap<Entity, V>) -> Vec<Entity> {
        let mut keys: Vec<Entity> = queue.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;

    #[test]
    fn len_counts_every_queue() {
        let mut world = World::new();
        let [a, b, c, d] = [(); 4].map(|_| world.spawn_empty());
        let mut queues = LoadQueues::new();
        queues.labels.insert(a, LabelEntry { table: b, sprite: c });
        queues.checkboxes.insert(d, CheckboxEntry { sprite: c });

        assert_eq!(queues.len(), 2);
        assert!(queues.contains(a));
        assert!(!queues.contains(b));
    }

    #[test]
    fn sorted_keys_are_ordered() {
        let mut world = World::new();
        let entities: Vec<_> = (0..5).map(|_| world.spawn_empty()).collect();
        let mut queue = HashMap::new();
        for &e in entities.iter().rev() {
            queue.insert(e, CheckboxEntry { sprite: e });
        }
        assert_eq!(LoadQueues::sorted_keys(&queue), entities);
    }
}
