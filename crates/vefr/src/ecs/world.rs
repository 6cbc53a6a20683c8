//! # World: Entities, Components, Resources
//!
//! The [`World`] owns every entity and component the widget pipeline touches,
//! plus singleton resources (the render system, the asset loader, the input
//! state, configuration).
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │ World                                                 │
//! │  allocator:        generational entity ids            │
//! │  archetypes:       sorted TypeId set → Archetype      │
//! │  entity_locations: entity index → (archetype, row)    │
//! │  resources:        TypeId → Box<dyn Any>              │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The world has a single owner per tick. Systems that need a resource and
//! the world at the same time use the extract/reinsert pattern:
//! [`resource_remove`](World::resource_remove), work, then
//! [`insert_resource`](World::insert_resource).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::archetype::{Archetype, ArchetypeKey, archetype_key};
use super::component::{ComponentColumn, component_type_id};
use super::entity::{Entity, EntityAllocator};
use super::hierarchy::{Children, SceneGraphNode};
use super::query::{Filter, QueryParam};

#[derive(Clone)]
struct EntityLocation {
    archetype_key: ArchetypeKey,
    row: usize,
}

/// The central container for all pipeline state.
pub struct World {
    allocator: EntityAllocator,
    archetypes: HashMap<ArchetypeKey, Archetype>,
    entity_locations: HashMap<u32, EntityLocation>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            archetypes: HashMap::new(),
            entity_locations: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource, replacing any existing one of the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Take a resource out of the world. Returns `None` if not present.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entity Management ────────────────────────────────────────────

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Returns `true` if `entity` is alive and carries a `T`.
    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Every entity carrying a `T`.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        self.filtered(&Filter::new().require::<T>())
    }

    /// Every entity carrying all component types required by `filter`.
    ///
    /// Results are sorted by entity so callers iterate deterministically.
    pub fn filtered(&self, filter: &Filter) -> Vec<Entity> {
        let mut result: Vec<Entity> = self
            .archetypes
            .values()
            .filter(|arch| arch.has_all(filter.required()))
            .flat_map(|arch| arch.entities.iter().copied())
            .collect();
        result.sort_unstable();
        result
    }

    // ── Spawn / Despawn ──────────────────────────────────────────────

    /// Spawn an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        let key = archetype_key(Vec::new());
        let arch = self
            .archetypes
            .entry(key.clone())
            .or_insert_with(|| Archetype::new(HashMap::new()));
        let row = arch.entities.len();
        arch.entities.push(entity);
        self.entity_locations.insert(
            entity.index,
            EntityLocation {
                archetype_key: key,
                row,
            },
        );
        entity
    }

    /// Spawn an entity with a single component.
    pub fn spawn_one<T: 'static + Send + Sync>(&mut self, component: T) -> Entity {
        self.spawn((component,))
    }

    /// Spawn an entity with a bundle of components (tuple).
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        let entity = self.allocator.allocate();
        let key = archetype_key(B::type_ids());
        let arch = self
            .archetypes
            .entry(key.clone())
            .or_insert_with(|| Archetype::new(B::create_columns()));
        let row = arch.entities.len();
        arch.entities.push(entity);
        bundle.push_into(&mut arch.columns);
        self.entity_locations.insert(
            entity.index,
            EntityLocation {
                archetype_key: key,
                row,
            },
        );
        entity
    }

    /// Despawn an entity. Returns `false` if it was already dead.
    ///
    /// References other entities hold to it (queue entries, button state
    /// slots, scene-graph parents) are not chased; they fail their next
    /// liveness check instead.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }

        if let Some(loc) = self.entity_locations.remove(&entity.index) {
            if let Some(arch) = self.archetypes.get_mut(&loc.archetype_key) {
                if let Some(swapped) = arch.swap_remove(loc.row) {
                    if let Some(swapped_loc) = self.entity_locations.get_mut(&swapped.index) {
                        swapped_loc.row = loc.row;
                    }
                }
            }
        }

        self.allocator.deallocate(entity)
    }

    /// Despawn an entity and everything below it in the scene graph.
    ///
    /// Also detaches it from its parent's [`Children`] list.
    pub fn despawn_recursive(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }

        if let Some(parent) = self.get::<SceneGraphNode>(entity).and_then(|n| n.parent) {
            if let Some(children) = self.get_mut::<Children>(parent) {
                children.0.retain(|&c| c != entity);
            }
        }

        let mut to_despawn = vec![entity];
        let mut i = 0;
        while i < to_despawn.len() {
            if let Some(children) = self.get::<Children>(to_despawn[i]) {
                let child_list = children.0.clone();
                to_despawn.extend(child_list);
            }
            i += 1;
        }

        for e in to_despawn {
            self.despawn(e);
        }
        true
    }

    /// Link `child` under `parent` in the scene graph.
    ///
    /// The link is a non-owning back reference plus an entry in the parent's
    /// [`Children`] list. Re-linking moves the child; linking twice to the
    /// same parent is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if either entity is dead.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) {
        assert!(
            self.is_alive(parent),
            "Cannot parent {child:?} under dead entity {parent:?}"
        );

        let previous = self.get::<SceneGraphNode>(child).and_then(|n| n.parent);
        if previous == Some(parent) {
            return;
        }
        if let Some(old) = previous {
            if let Some(children) = self.get_mut::<Children>(old) {
                children.0.retain(|&c| c != child);
            }
        }

        self.insert(
            child,
            SceneGraphNode {
                parent: Some(parent),
            },
        );
        match self.get_mut::<Children>(parent) {
            Some(children) => children.0.push(child),
            None => self.insert(parent, Children(vec![child])),
        }
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// Returns `None` if the entity is dead or lacks the component.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let loc = self.entity_locations.get(&entity.index)?;
        let arch = self.archetypes.get(&loc.archetype_key)?;
        let col = arch.columns.get(&TypeId::of::<T>())?;
        Some(col.get::<T>(loc.row))
    }

    /// Returns `None` if the entity is dead or lacks the component.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let loc = self.entity_locations.get(&entity.index)?;
        let arch = self.archetypes.get_mut(&loc.archetype_key)?;
        let col = arch.columns.get_mut(&TypeId::of::<T>())?;
        Some(col.get_mut::<T>(loc.row))
    }

    // ── Dynamic Component Add/Remove ─────────────────────────────────

    /// Add a component, replacing an existing one of the same type.
    ///
    /// Replacement (rather than stacking) is what keeps marker components
    /// like `Ready` at most one per entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) {
        assert!(
            self.allocator.is_alive(entity),
            "Cannot insert component `{}` on dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );

        if let Some(slot) = self.get_mut::<T>(entity) {
            *slot = component;
            return;
        }

        let tid = TypeId::of::<T>();
        let mut target = self.location(entity).archetype_key;
        target.push(tid);
        let mut taken = self.move_entity(entity, archetype_key(target));

        taken.insert(tid, Box::new(component));
        self.fill_row(entity, taken);
    }

    /// Remove a component. Returns `true` if it was present.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        assert!(
            self.allocator.is_alive(entity),
            "Cannot remove component `{}` from dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );

        let tid = TypeId::of::<T>();
        let current = self.location(entity).archetype_key;
        if !current.contains(&tid) {
            return false;
        }

        let target: ArchetypeKey = current.into_iter().filter(|&t| t != tid).collect();
        let mut taken = self.move_entity(entity, target);
        taken.remove(&tid);
        self.fill_row(entity, taken);
        true
    }

    fn location(&self, entity: Entity) -> EntityLocation {
        self.entity_locations
            .get(&entity.index)
            .cloned()
            .unwrap_or_else(|| panic!("live entity {entity:?} has no location"))
    }

    /// Pull every component of `entity` out of its archetype and register it
    /// at the end of the `target` archetype. The caller pushes the returned
    /// values (adjusted) back via [`fill_row`](Self::fill_row).
    fn move_entity(
        &mut self,
        entity: Entity,
        target: ArchetypeKey,
    ) -> HashMap<TypeId, Box<dyn Any + Send + Sync>> {
        let loc = self.location(entity);

        let old_arch = self
            .archetypes
            .get_mut(&loc.archetype_key)
            .unwrap_or_else(|| panic!("archetype of {entity:?} vanished"));
        let taken = old_arch
            .columns
            .iter_mut()
            .map(|(&tid, col)| (tid, col.take(loc.row)))
            .collect();
        old_arch.entities.swap_remove(loc.row);
        if let Some(&swapped) = old_arch.entities.get(loc.row) {
            if let Some(swapped_loc) = self.entity_locations.get_mut(&swapped.index) {
                swapped_loc.row = loc.row;
            }
        }

        let new_arch = self
            .archetypes
            .entry(target.clone())
            .or_insert_with(|| Archetype::for_key(&target));
        let row = new_arch.entities.len();
        new_arch.entities.push(entity);
        self.entity_locations.insert(
            entity.index,
            EntityLocation {
                archetype_key: target,
                row,
            },
        );

        taken
    }

    fn fill_row(&mut self, entity: Entity, mut values: HashMap<TypeId, Box<dyn Any + Send + Sync>>) {
        let loc = self.location(entity);
        let arch = self
            .archetypes
            .get_mut(&loc.archetype_key)
            .unwrap_or_else(|| panic!("archetype of {entity:?} vanished"));
        for (tid, col) in arch.columns.iter_mut() {
            let value = values
                .remove(tid)
                .unwrap_or_else(|| panic!("missing component value while moving {entity:?}"));
            col.push_any(value);
        }
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Run `f` for every entity having all the requested component types.
    ///
    /// ```ignore
    /// world.query::<(&mut Transform, &Button)>(|entity, (transform, button)| {
    ///     transform.translation.x += 1.0;
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        self.query_types::<Q>(Q::type_ids(), f);
    }

    /// Like [`query`](Self::query), restricted to entities that also carry the
    /// marker `F`. The marker itself is not yielded.
    pub fn query_filtered<Q: QueryParam, F: 'static + Send + Sync>(
        &mut self,
        f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let mut required = Q::type_ids();
        required.push(component_type_id::<F>());
        self.query_types::<Q>(required, f);
    }

    fn query_types<Q: QueryParam>(
        &mut self,
        required: Vec<TypeId>,
        mut f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let matching: Vec<ArchetypeKey> = self
            .archetypes
            .iter()
            .filter(|(_, arch)| arch.has_all(&required))
            .map(|(key, _)| key.clone())
            .collect();

        for key in matching {
            let Some(arch) = self.archetypes.get_mut(&key) else {
                continue;
            };
            let mut cols = Q::extract(&mut arch.columns);
            for (row, &entity) in arch.entities.iter().enumerate() {
                f(entity, Q::fetch(&mut cols, row));
            }
            Q::restore(cols, &mut arch.columns);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Spawn bundles ────────────────────────────────────────────────────────

/// Tuples of components that can be spawned in one go.
pub trait SpawnBundle {
    fn type_ids() -> Vec<TypeId>;
    fn create_columns() -> HashMap<TypeId, ComponentColumn>;
    fn push_into(self, columns: &mut HashMap<TypeId, ComponentColumn>);
}

macro_rules! impl_spawn_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> SpawnBundle for ($($T,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(component_type_id::<$T>()),+]
            }

            fn create_columns() -> HashMap<TypeId, ComponentColumn> {
                let mut map = HashMap::new();
                $(map.insert(component_type_id::<$T>(), ComponentColumn::new());)+
                map
            }

            #[allow(non_snake_case)]
            fn push_into(self, columns: &mut HashMap<TypeId, ComponentColumn>) {
                let ($($T,)+) = self;
                $(
                    if let Some(col) = columns.get_mut(&component_type_id::<$T>()) {
                        col.push::<$T>($T);
                    }
                )+
            }
        }
    };
}

impl_spawn_bundle!(A);
impl_spawn_bundle!(A, B);
impl_spawn_bundle!(A, B, C);
impl_spawn_bundle!(A, B, C, D);
impl_spawn_bundle!(A, B, C, D, E);
impl_spawn_bundle!(A, B, C, D, E, F);
