//! # Entity: Opaque Widget and Resource Identifiers
//!
//! An [`Entity`] carries no data. Widgets, glyph tables, sprites and the
//! per-state button sprites are all entities; the [`World`](super::world::World)
//! maps them to components.
//!
//! Entity ids are referenced from many places that do not own them: load-queue
//! entries, button state slots, scene-graph back references. Those references
//! are validated by an existence check, never by reference counting, so the id
//! must detect reuse. Each slot therefore pairs an index with a generation:
//!
//! ```text
//! Entity { index: 7, generation: 0 }  ← glyph table spawned by a label
//! Entity { index: 7, generation: 1 }  ← slot recycled after the table is despawned
//! ```
//!
//! A load-queue entry still holding `7v0` sees a dead entity, not the new
//! occupant.

use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Slot index in the allocator.
    pub(crate) index: u32,
    /// Bumped each time the slot is recycled.
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity ids and recycles freed slots.
///
/// ```text
/// generations: [0, 1, 0]   ← one counter per slot ever handed out
/// free_list:   [1]         ← slots waiting for reuse
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Allocate an id, preferring a recycled slot.
    pub fn allocate(&mut self) -> Entity {
        match self.free_list.pop() {
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Release an id. Returns `false` for stale or unknown handles.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }
}
