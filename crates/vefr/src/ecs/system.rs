//! # Systems and the Schedule
//!
//! A system is any `FnMut(&mut World)`. The [`Schedule`] runs systems in the
//! order they were added, once per tick: asset loading first, then the widget
//! factory, then input and transform propagation. There is no parallelism;
//! the world has exactly one owner per tick.

use std::time::{Duration, Instant};

use super::world::World;

/// A unit of per-tick work on the [`World`].
pub trait System {
    fn run(&mut self, world: &mut World);
}

impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// How long one system took during the last [`Schedule::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SystemTiming {
    pub name: String,
    pub duration: Duration,
}

/// An ordered list of systems.
#[derive(Default)]
pub struct Schedule {
    systems: Vec<NamedSystem>,
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        let name = short_system_name(std::any::type_name::<S>());
        log::debug!("schedule: added system `{name}`");
        self.systems.push(NamedSystem {
            name,
            system: Box::new(system),
        });
    }

    /// Run every system once, in insertion order.
    pub fn run(&mut self, world: &mut World) {
        self.timings.clear();
        for ns in &mut self.systems {
            let start = Instant::now();
            ns.system.run(world);
            self.timings.push(SystemTiming {
                name: ns.name.clone(),
                duration: start.elapsed(),
            });
        }
    }

    /// Per-system timings from the most recent run.
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// `vefr::widget::widget_system` → `widget_system`; closures → `<closure>`.
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_assets(_world: &mut World) {}

    #[test]
    fn named_after_function() {
        let mut schedule = Schedule::new();
        schedule.add_system(load_assets);
        schedule.add_system(|_: &mut World| {});
        assert_eq!(schedule.systems[0].name, "load_assets");
        assert_eq!(schedule.systems[1].name, "<closure>");
    }

    #[test]
    fn runs_in_insertion_order() {
        let mut world = World::new();
        world.insert_resource(Vec::<u8>::new());

        let mut schedule = Schedule::new();
        schedule.add_system(|w: &mut World| w.resource_mut::<Vec<u8>>().push(1));
        schedule.add_system(|w: &mut World| w.resource_mut::<Vec<u8>>().push(2));
        schedule.run(&mut world);

        assert_eq!(world.resource::<Vec<u8>>(), &vec![1, 2]);
        assert_eq!(schedule.timings().len(), 2);
    }
}
