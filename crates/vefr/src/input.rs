//! Mouse input state.
//!
//! The [`Input`] resource tracks which buttons are held, which went down this
//! tick and which came up this tick. A windowed host feeds it from winit
//! events; headless hosts and tests call [`Input::press`] and
//! [`Input::release`] directly. [`clear_input`] runs at the end of every tick
//! so the "just" sets cover exactly one tick.

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::event::MouseButton;

use crate::ecs::World;
use crate::math::Vec2;

pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Went down this tick.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Came up this tick.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    pub(crate) fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse cursor position in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

impl CursorPosition {
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// End-of-tick system: forget this tick's press/release edges.
pub fn clear_input(world: &mut World) {
    if let Some(input) = world.get_resource_mut::<Input<MouseButton>>() {
        input.clear_just();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered() {
        let mut input = Input::new();
        input.press(MouseButton::Left);
        assert!(input.just_pressed(MouseButton::Left));
        assert!(input.pressed(MouseButton::Left));

        input.clear_just();
        input.press(MouseButton::Left);
        assert!(!input.just_pressed(MouseButton::Left));
        assert!(input.pressed(MouseButton::Left));
    }

    #[test]
    fn release_clears_pressed() {
        let mut input = Input::new();
        input.press(MouseButton::Right);
        input.release(MouseButton::Right);
        assert!(input.just_released(MouseButton::Right));
        assert!(!input.pressed(MouseButton::Right));
        assert!(!input.just_released(MouseButton::Left));
    }

    #[test]
    fn clear_input_system_resets_edges() {
        let mut world = World::new();
        let mut input = Input::new();
        input.press(MouseButton::Left);
        world.insert_resource(input);

        clear_input(&mut world);
        let input = world.resource::<Input<MouseButton>>();
        assert!(!input.just_pressed(MouseButton::Left));
        assert!(input.pressed(MouseButton::Left));
    }
}
