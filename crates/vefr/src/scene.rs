//! Scene boot state.
//!
//! A scene stays [`SceneState::Uninitialized`] until a render backend is
//! bound, re-checking every tick with no backoff. Once booted it never goes
//! back.

use std::sync::Arc;

use crate::ecs::World;
use crate::render::{RenderSystem, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    #[default]
    Uninitialized,
    Booted,
}

/// Tracks one subsystem's boot and remembers the renderer it booted with.
#[derive(Default)]
pub struct BootGate {
    state: SceneState,
    renderer: Option<Arc<dyn Renderer>>,
}

impl BootGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_booted(&self) -> bool {
        self.state == SceneState::Booted
    }

    /// The renderer captured at boot.
    pub fn renderer(&self) -> Option<&Arc<dyn Renderer>> {
        self.renderer.as_ref()
    }

    /// Try to boot. Returns the state after the attempt.
    pub fn poll(&mut self, world: &World, name: &str) -> SceneState {
        if self.is_booted() {
            return self.state;
        }
        let Some(renderer) = world
            .get_resource::<RenderSystem>()
            .and_then(|rs| rs.renderer.clone())
        else {
            log::trace!("{name}: waiting for a renderer");
            return self.state;
        };

        log::info!("{name}: booted with `{}` renderer", renderer.name());
        self.renderer = Some(renderer);
        self.state = SceneState::Booted;
        self.state
    }
}
