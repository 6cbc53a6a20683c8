//! Click handling.
//!
//! An [`Interactive`] entity reacts when its mouse button goes down while the
//! cursor is inside its rect. Handlers run in entity order; the first one that
//! returns `true` consumes the click.

use std::fmt;
use std::sync::Arc;

use crate::ecs::{Entity, World};
use crate::input::{CursorPosition, Input, MouseButton};
use crate::math::Rect;

pub type InteractionCallback = Arc<dyn Fn(&mut World, Entity) -> bool + Send + Sync>;

pub struct Interactive {
    pub button: MouseButton,
    pub rect: Rect,
    pub enabled: bool,
    callback: InteractionCallback,
}

impl fmt::Debug for Interactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactive")
            .field("button", &self.button)
            .field("rect", &self.rect)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Interactive {
    pub fn new(
        button: MouseButton,
        rect: Rect,
        callback: impl Fn(&mut World, Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            button,
            rect,
            enabled: true,
            callback: Arc::new(callback),
        }
    }
}

/// Dispatch this tick's mouse presses to interactive entities.
pub fn process_interactions(world: &mut World) {
    let Some(cursor) = world.get_resource::<CursorPosition>().map(|c| c.as_vec2()) else {
        return;
    };
    let Some(input) = world.get_resource::<Input<MouseButton>>() else {
        return;
    };

    let hits: Vec<(Entity, InteractionCallback)> = world
        .entities_with::<Interactive>()
        .into_iter()
        .filter_map(|e| {
            let i = world.get::<Interactive>(e)?;
            let hit = i.enabled && input.just_pressed(i.button) && i.rect.contains(cursor);
            hit.then(|| (e, Arc::clone(&i.callback)))
        })
        .collect();

    for (entity, callback) in hits {
        if callback(world, entity) {
            log::trace!("click consumed by {entity}");
            break;
        }
    }
}
