//! # Component Columns
//!
//! Widgets attach heterogeneous data to entities: a `Label` here, a
//! `FontTable` there, a zero-sized `Ready` marker almost everywhere. Each
//! archetype keeps one [`ComponentColumn`] per component type. Values are
//! boxed as `dyn Any` and recovered with a checked downcast, so the storage
//! needs no `unsafe`.

use std::any::{Any, TypeId};

pub(crate) fn component_type_id<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}

/// A type-erased column of components, one row per entity of the archetype.
pub struct ComponentColumn {
    data: Vec<Box<dyn Any + Send + Sync>>,
}

impl ComponentColumn {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn push<T: 'static + Send + Sync>(&mut self, value: T) {
        self.data.push(Box::new(value));
    }

    /// # Panics
    ///
    /// Panics if the row is out of bounds or holds another type. Either is an
    /// archetype bookkeeping bug.
    pub fn get<T: 'static>(&self, row: usize) -> &T {
        self.data[row].downcast_ref().unwrap_or_else(|| {
            panic!(
                "column row {row} does not hold a `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get).
    pub fn get_mut<T: 'static>(&mut self, row: usize) -> &mut T {
        self.data[row].downcast_mut().unwrap_or_else(|| {
            panic!(
                "column row {row} does not hold a `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    /// Swap-remove and drop the value at `row`.
    pub fn swap_remove(&mut self, row: usize) {
        self.data.swap_remove(row);
    }

    /// Swap-remove the value at `row` and hand it back boxed, for moving an
    /// entity between archetypes.
    pub fn take(&mut self, row: usize) -> Box<dyn Any + Send + Sync> {
        self.data.swap_remove(row)
    }

    pub fn push_any(&mut self, value: Box<dyn Any + Send + Sync>) {
        self.data.push(value);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut col = ComponentColumn::new();
        col.push(String::from("Test"));
        col.push(String::from("Cancel"));
        assert_eq!(col.get::<String>(1), "Cancel");
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn swap_remove_moves_last_row() {
        let mut col = ComponentColumn::new();
        col.push(10u32);
        col.push(20u32);
        col.push(30u32);
        col.swap_remove(0);
        assert_eq!(*col.get::<u32>(0), 30);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn take_then_push_any_preserves_value() {
        let mut from = ComponentColumn::new();
        from.push(7u64);
        let boxed = from.take(0);

        let mut to = ComponentColumn::new();
        to.push_any(boxed);
        assert_eq!(*to.get::<u64>(0), 7);
        assert_eq!(from.len(), 0);
    }

    #[test]
    fn zero_sized_markers_are_stored() {
        struct Marker;
        let mut col = ComponentColumn::new();
        col.push(Marker);
        col.push(Marker);
        assert_eq!(col.len(), 2);
    }
}
