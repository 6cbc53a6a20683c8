//! App builder and plugin system.
//!
//! The [`App`] owns the world and the per-tick schedule. It runs either
//! headless, one [`update`](App::update) at a time, or inside a winit event
//! loop via [`run`](App::run).
//!
//! ## Example
//!
//! ```ignore
//! use vefr::prelude::*;
//!
//! let mut app = App::new()
//!     .insert_resource(RenderSystem::new(Arc::new(SoftwareRenderer::new())))
//!     .add_plugins(WidgetPlugin)
//!     .add_startup_system(spawn_menu);
//! app.run_for(10);
//! ```

use winit::event_loop::{ControlFlow, EventLoop};

use crate::ecs::system::{Schedule, System, SystemTiming};
use crate::ecs::world::World;
use crate::time::Time;
use crate::window::WinitApp;

/// A plugin can add resources, systems, and other configuration to the app.
pub trait Plugin: Send + Sync {
    fn build(&self, app: &mut App);
}

/// Per-system timings from the most recent tick. Inserted by [`App::update`].
#[derive(Debug, Clone, Default)]
pub struct SystemTimings(pub Vec<SystemTiming>);

/// The app builder.
pub struct App {
    pub world: World,
    pub startup_systems: Schedule,
    pub systems: Schedule,
    title: String,
    started: bool,
}

impl App {
    /// Create a new app with an empty world and no systems.
    pub fn new() -> Self {
        Self {
            world: World::new(),
            startup_systems: Schedule::new(),
            systems: Schedule::new(),
            title: String::from("vefr"),
            started: false,
        }
    }

    /// Set the window title.
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Insert a resource into the world.
    pub fn insert_resource<T: 'static + Send + Sync>(mut self, value: T) -> Self {
        self.world.insert_resource(value);
        self
    }

    /// Add a system that runs once, before the first tick.
    pub fn add_startup_system<S: System + 'static>(mut self, system: S) -> Self {
        self.startup_systems.add_system(system);
        self
    }

    /// Add a system that runs every tick.
    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.systems.add_system(system);
        self
    }

    /// Apply a plugin.
    pub fn add_plugins<P: Plugin>(mut self, plugin: P) -> Self {
        plugin.build(&mut self);
        self
    }

    /// Run one tick: startup systems first time round, then the schedule.
    pub fn update(&mut self) {
        if !self.started {
            self.started = true;
            self.startup_systems.run(&mut self.world);
        }
        if let Some(time) = self.world.get_resource_mut::<Time>() {
            time.update();
        }
        self.systems.run(&mut self.world);
        self.world
            .insert_resource(SystemTimings(self.systems.timings().to_vec()));
    }

    /// Run `ticks` ticks back to back without a window.
    pub fn run_for(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.update();
        }
    }

    /// Open a window and tick once per redraw until it is closed.
    pub fn run(self) -> ! {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(err) => crate::logging::fatal(format!("cannot create event loop: {err}")),
        };
        event_loop.set_control_flow(ControlFlow::Poll);

        let title = self.title.clone();
        let mut app = WinitApp::new(self, title);
        if let Err(err) = event_loop.run_app(&mut app) {
            crate::logging::fatal(format!("event loop error: {err}"));
        }
        std::process::exit(0);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    struct CounterPlugin;

    impl Plugin for CounterPlugin {
        fn build(&self, app: &mut App) {
            app.world.insert_resource(Counter(0));
            app.systems.add_system(|world: &mut World| {
                world.resource_mut::<Counter>().0 += 1;
            });
        }
    }

    #[test]
    fn startup_runs_once_before_first_tick() {
        let mut app = App::new()
            .add_plugins(CounterPlugin)
            .add_startup_system(|world: &mut World| {
                world.resource_mut::<Counter>().0 = 100;
            });
        app.run_for(3);
        assert_eq!(app.world.resource::<Counter>().0, 103);
    }

    #[test]
    fn update_records_timings_and_time() {
        let mut app = App::new()
            .insert_resource(Time::new())
            .add_plugins(CounterPlugin);
        app.run_for(2);
        assert_eq!(app.world.resource::<Time>().tick_count(), 2);
        assert_eq!(app.world.resource::<SystemTimings>().0.len(), 1);
    }
}
