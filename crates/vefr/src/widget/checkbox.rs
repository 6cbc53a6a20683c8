//! Checkbox widgets.
//!
//! A checkbox is a fixed-size click box drawn from a two-frame sheet: frame
//! 0 unchecked, frame 1 checked. Once its sprite is ready it becomes
//! clickable through an [`Interactive`] component whose callback runs
//! [`Checkbox::activate`].

use std::fmt;
use std::sync::Arc;

use super::WidgetFactory;
use super::button::PALETTE_UNITS;
use super::interactive::Interactive;
use super::queue::CheckboxEntry;
use crate::ecs::{Entity, SceneGraphNode, World};
use crate::input::MouseButton;
use crate::math::{Rect, Transform};
use crate::readiness::{is_ready, mark_ready};
use crate::render::{Surface, Texture};
use crate::sprite::{Segments, Sprite, SpriteSheet};

/// Called with the checkbox entity and its new checked state. The return
/// value is handed back from [`Checkbox::activate`].
pub type CheckboxCallback = Box<dyn FnMut(Entity, bool) -> bool + Send + Sync>;

/// Static appearance and placement of a checkbox.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxLayout {
    pub sprite_path: &'static str,
    pub palette_path: &'static str,
    pub segments: Segments,
    pub fixed_width: u32,
    pub fixed_height: u32,
    pub x: f32,
    pub y: f32,
    pub clickable_rect: Rect,
}

impl CheckboxLayout {
    pub fn at(x: f32, y: f32) -> Self {
        let (fixed_width, fixed_height) = (16, 15);
        Self {
            sprite_path: "/data/global/ui/FrontEnd/clickbox.dc6",
            palette_path: PALETTE_UNITS,
            segments: Segments::SINGLE,
            fixed_width,
            fixed_height,
            x,
            y,
            clickable_rect: Rect::from_size(x, y, fixed_width as f32, fixed_height as f32),
        }
    }
}

/// Checkbox widget state.
pub struct Checkbox {
    pub layout: CheckboxLayout,
    pub sprite: Option<Arc<SpriteSheet>>,
    pressed: bool,
    enabled: bool,
    callback: Option<CheckboxCallback>,
    shown: Option<(usize, Arc<Surface>)>,
}

impl fmt::Debug for Checkbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkbox")
            .field("layout", &self.layout)
            .field("pressed", &self.pressed)
            .field("enabled", &self.enabled)
            .field("has_callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Checkbox {
    pub fn new(layout: CheckboxLayout) -> Self {
        Self {
            layout,
            sprite: None,
            pressed: false,
            enabled: true,
            callback: None,
            shown: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn on_activated(&mut self, callback: CheckboxCallback) {
        self.callback = Some(callback);
    }

    /// Toggle and notify. Disabled checkboxes ignore activation and return
    /// `false`; without a callback a toggle returns `true`.
    pub fn activate(&mut self, entity: Entity) -> bool {
        if !self.enabled {
            return false;
        }
        self.pressed = !self.pressed;
        match self.callback.as_mut() {
            Some(cb) => cb(entity, self.pressed),
            None => true,
        }
    }

    /// Frame block for the current state.
    pub fn frame(&self) -> usize {
        usize::from(self.pressed)
    }

    /// Surface for the current frame, composed on first use of each frame.
    /// A sheet without a checked frame shows frame 0 for both states.
    fn current_surface(&mut self) -> Option<Arc<Surface>> {
        let frame = self.frame();
        if let Some((shown, surface)) = &self.shown {
            if *shown == frame {
                return Some(Arc::clone(surface));
            }
        }
        let sheet = self.sprite.as_ref()?;
        let surface = sheet
            .compose(self.layout.segments, frame)
            .or_else(|| sheet.compose(self.layout.segments, 0))?;
        let surface = Arc::new(surface);
        self.shown = Some((frame, Arc::clone(&surface)));
        Some(surface)
    }
}

impl WidgetFactory {
    /// Create a checkbox at `(x, y)`.
    pub fn checkbox(
        &mut self,
        world: &mut World,
        x: f32,
        y: f32,
        checked: bool,
        enabled: bool,
        callback: Option<CheckboxCallback>,
    ) -> Entity {
        let layout = CheckboxLayout::at(x, y);
        // Positioned relative to the checkbox once parented.
        let sprite = self.sprites.segmented_sprite(
            world,
            0.0,
            0.0,
            layout.sprite_path,
            layout.palette_path,
            layout.segments,
        );

        let mut checkbox = Checkbox::new(layout);
        checkbox.set_pressed(checked);
        checkbox.set_enabled(enabled);
        if let Some(cb) = callback {
            checkbox.on_activated(cb);
        }
        let entity = world.spawn((checkbox, Transform::from_xy(x, y)));

        self.queues.checkboxes.insert(entity, CheckboxEntry { sprite });
        log::debug!("checkbox {entity} queued");
        entity
    }

    pub(super) fn process_checkbox(&mut self, world: &mut World, checkbox: Entity) {
        let Some(entry) = self.queues.checkboxes.get(&checkbox).copied() else {
            return;
        };
        if !is_ready(world, entry.sprite) {
            return;
        }
        let Some(rect) = world.get::<Checkbox>(checkbox).map(|c| c.layout.clickable_rect) else {
            return;
        };

        if !world.has::<SceneGraphNode>(checkbox) {
            world.insert(checkbox, SceneGraphNode::default());
        }
        if let Some(sheet) = world.get::<Sprite>(entry.sprite).map(|s| Arc::clone(&s.sheet)) {
            if let Some(c) = world.get_mut::<Checkbox>(checkbox) {
                c.sprite = Some(sheet);
            }
            world.set_parent(entry.sprite, checkbox);
        }

        world.insert(
            checkbox,
            Interactive::new(MouseButton::Left, rect, |world, entity| {
                world
                    .get_mut::<Checkbox>(entity)
                    .is_some_and(|c| c.activate(entity))
            }),
        );
        world.insert(checkbox, Texture::default());
        mark_ready(world, checkbox);
        self.queues.checkboxes.remove(&checkbox);
        log::debug!("checkbox {checkbox} ready");
    }

    pub(super) fn update_checkbox(&mut self, world: &mut World, checkbox: Entity) {
        let Some(surface) = world.get_mut::<Checkbox>(checkbox).and_then(|c| c.current_surface()) else {
            return;
        };
        let unchanged = world
            .get::<Texture>(checkbox)
            .is_some_and(|t| t.surface_id() == Some(surface.id()));
        if !unchanged {
            world.insert(checkbox, Texture::new(surface));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn clickable_rect_uses_fixed_size() {
        let layout = CheckboxLayout::at(50.0, 60.0);
        assert_eq!(layout.clickable_rect, Rect::from_size(50.0, 60.0, 16.0, 15.0));
    }

    #[test]
    fn activate_toggles_and_reports() {
        let mut world = World::new();
        let e = world.spawn_empty();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut cb = Checkbox::new(CheckboxLayout::at(0.0, 0.0));
        cb.on_activated(Box::new(move |entity: Entity, checked: bool| {
            sink.lock().unwrap().push((entity, checked));
            true
        }));

        assert!(cb.activate(e));
        assert!(cb.activate(e));
        assert_eq!(*seen.lock().unwrap(), vec![(e, true), (e, false)]);
    }

    #[test]
    fn disabled_checkbox_ignores_activation() {
        let mut world = World::new();
        let e = world.spawn_empty();
        let mut cb = Checkbox::new(CheckboxLayout::at(0.0, 0.0));
        cb.set_enabled(false);
        assert!(!cb.activate(e));
        assert!(!cb.is_pressed());
    }

    #[test]
    fn single_frame_sheet_falls_back_to_frame_zero() {
        let image = image::RgbaImage::new(4, 4);
        let mut cb = Checkbox::new(CheckboxLayout::at(0.0, 0.0));
        cb.sprite = Some(Arc::new(SpriteSheet::from_strip(&image)));
        cb.set_pressed(true);
        assert!(cb.current_surface().is_some());
    }

    #[test]
    fn surface_is_reused_until_frame_changes() {
        let image = image::RgbaImage::new(8, 4);
        let mut cb = Checkbox::new(CheckboxLayout::at(0.0, 0.0));
        cb.sprite = Some(Arc::new(SpriteSheet::from_strip(&image)));

        let first = cb.current_surface().unwrap();
        let again = cb.current_surface().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        cb.set_pressed(true);
        let checked = cb.current_surface().unwrap();
        assert_ne!(checked.id(), first.id());
    }
}
