//! # Queries, Filters and Subscriptions
//!
//! Two ways to find entities:
//!
//! - [`QueryParam`] drives the closure-based `World::query`, which borrows
//!   component data while iterating. Columns are lifted out of the archetype
//!   for the duration of the closure so `(&A, &mut B)` type-checks without
//!   aliasing.
//! - [`Filter`] / [`Subscription`] only answer *which* entities match a set of
//!   required component types. The widget factory uses these for its update
//!   passes ("every `Label` that is `Ready`"), collecting ids first and then
//!   mutating the world freely.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::ComponentColumn;
use super::entity::Entity;
use super::world::World;

/// Something fetchable per entity from an archetype's columns.
///
/// Implemented for `&T`, `&mut T` and tuples of params.
pub trait QueryParam {
    type Item<'w>;
    type Column;

    fn type_ids() -> Vec<TypeId>;
    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column;
    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>);
    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_>;
}

fn take_column<T: 'static>(
    columns: &mut HashMap<TypeId, ComponentColumn>,
) -> (TypeId, ComponentColumn) {
    let tid = TypeId::of::<T>();
    let col = columns.remove(&tid).unwrap_or_else(|| {
        panic!(
            "query matched an archetype without a `{}` column",
            std::any::type_name::<T>()
        )
    });
    (tid, col)
}

impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Column = (TypeId, ComponentColumn);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
        take_column::<T>(columns)
    }

    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
        columns.insert(col.0, col.1);
    }

    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
        col.1.get::<T>(index)
    }
}

impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Column = (TypeId, ComponentColumn);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
        take_column::<T>(columns)
    }

    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
        columns.insert(col.0, col.1);
    }

    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
        col.1.get_mut::<T>(index)
    }
}

macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Column = ($($P::Column,)+);

            fn type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($P::type_ids());)+
                ids
            }

            fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
                ($($P::extract(columns),)+)
            }

            #[allow(non_snake_case)]
            fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
                let ($($P,)+) = col;
                $($P::restore($P, columns);)+
            }

            #[allow(non_snake_case)]
            fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
                let ($($P,)+) = col;
                ($($P::fetch($P, index),)+)
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);

/// A set of required component types.
///
/// ```ignore
/// let ready_labels = Filter::new().require::<Label>().require::<Ready>();
/// for label in world.filtered(&ready_labels) { /* ... */ }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    required: Vec<TypeId>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required component type (builder pattern).
    pub fn require<T: 'static + Send + Sync>(mut self) -> Self {
        let tid = TypeId::of::<T>();
        if !self.required.contains(&tid) {
            self.required.push(tid);
        }
        self
    }

    pub(crate) fn required(&self) -> &[TypeId] {
        &self.required
    }

    /// Turn the filter into a reusable subscription.
    pub fn build(self) -> Subscription {
        Subscription { filter: self }
    }
}

/// A named standing query: "give me the entities matching this filter now".
///
/// Subscriptions hold no entity list of their own; every call to
/// [`entities`](Self::entities) reflects the world as it is, so a widget that
/// gained `Ready` this tick shows up immediately.
#[derive(Debug, Clone)]
pub struct Subscription {
    filter: Filter,
}

impl Subscription {
    pub fn entities(&self, world: &World) -> Vec<Entity> {
        world.filtered(&self.filter)
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}
