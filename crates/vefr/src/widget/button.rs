//! # Button Widgets
//!
//! A button is a sprite sheet with one frame block per visual state plus an
//! optional label. The states share a sheet and follow a fixed offset
//! convention from the layout's base frame:
//!
//! ```text
//! Normal          base
//! Pressed         base + 1
//! Toggled         base + 2
//! PressedToggled  base + 3
//! Disabled        layout.disabled_frame, or Normal when there is none
//! ```
//!
//! Layouts without an image, or that never change frame, use Normal for all
//! five states. Aliasing reuses the Normal entity itself, so an aliased
//! Disabled state is the same sprite, not a copy.
//!
//! Assembly runs over several ticks:
//!
//! 1. wait for the label and base sprite to be `Ready`, then link both under
//!    the button in the scene graph;
//! 2. request the five state sprites (once);
//! 3. wait for all five to be `Ready`, then mark the button `Ready`.
//!
//! The update pass then copies the five state textures into the button and
//! publishes the one matching its current state.

use std::sync::Arc;

use super::WidgetFactory;
use super::queue::ButtonEntry;
use crate::ecs::{Entity, SceneGraphNode, World};
use crate::math::Transform;
use crate::readiness::{all_ready, mark_ready};
use crate::render::{Surface, Texture};
use crate::sprite::{Segments, Sprite, SpriteSheet};

pub const PRESSED_OFFSET: usize = 1;
pub const TOGGLED_OFFSET: usize = 2;
pub const PRESSED_TOGGLED_OFFSET: usize = 3;

pub(super) const PALETTE_UNITS: &str = "/data/global/palette/units/pal.dat";
const FONT_EXOCET10: &str = "/data/local/FONT/ENG/fontexocet10";
const FONT_RIDICULOUS: &str = "/data/local/FONT/ENG/fontridiculous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonType {
    Wide,
    Medium,
    Short,
    Tall,
    Cancel,
    Run,
    Buy,
    Sell,
    Repair,
}

/// Static appearance of a [`ButtonType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLayout {
    pub sprite_path: &'static str,
    pub palette_path: &'static str,
    /// Font stem for the label; `None` for icon buttons.
    pub font_path: Option<&'static str>,
    pub x_segments: u32,
    pub y_segments: u32,
    pub base_frame: usize,
    /// Frame block drawn while disabled; `None` reuses Normal.
    pub disabled_frame: Option<usize>,
    pub has_image: bool,
    pub allow_frame_change: bool,
    pub toggleable: bool,
    pub width: u32,
    pub height: u32,
}

const fn text_button(
    sprite_path: &'static str,
    font_path: &'static str,
    x_segments: u32,
    width: u32,
    height: u32,
) -> ButtonLayout {
    ButtonLayout {
        sprite_path,
        palette_path: PALETTE_UNITS,
        font_path: Some(font_path),
        x_segments,
        y_segments: 1,
        base_frame: 0,
        disabled_frame: None,
        has_image: true,
        allow_frame_change: true,
        toggleable: false,
        width,
        height,
    }
}

const fn icon_button(base_frame: usize) -> ButtonLayout {
    ButtonLayout {
        sprite_path: "/data/global/ui/PANEL/buysellbtn.dc6",
        palette_path: PALETTE_UNITS,
        font_path: None,
        x_segments: 1,
        y_segments: 1,
        base_frame,
        disabled_frame: None,
        has_image: true,
        allow_frame_change: true,
        toggleable: false,
        width: 32,
        height: 32,
    }
}

static WIDE: ButtonLayout = text_button(
    "/data/global/ui/FrontEnd/WideButtonBlank.dc6",
    FONT_EXOCET10,
    2,
    272,
    35,
);
static MEDIUM: ButtonLayout = text_button(
    "/data/global/ui/FrontEnd/MediumButtonBlank.dc6",
    FONT_EXOCET10,
    1,
    128,
    35,
);
static SHORT: ButtonLayout = text_button(
    "/data/global/ui/FrontEnd/ShortButtonBlank.dc6",
    FONT_RIDICULOUS,
    1,
    135,
    25,
);
static TALL: ButtonLayout = text_button(
    "/data/global/ui/FrontEnd/TallButtonBlank.dc6",
    FONT_EXOCET10,
    1,
    168,
    60,
);
static CANCEL: ButtonLayout = ButtonLayout {
    disabled_frame: Some(0),
    ..text_button(
        "/data/global/ui/FrontEnd/CancelButtonBlank.dc6",
        FONT_EXOCET10,
        1,
        128,
        35,
    )
};
static RUN: ButtonLayout = ButtonLayout {
    sprite_path: "/data/global/ui/PANEL/runbutton.dc6",
    palette_path: PALETTE_UNITS,
    font_path: None,
    x_segments: 1,
    y_segments: 1,
    base_frame: 0,
    disabled_frame: None,
    has_image: true,
    allow_frame_change: true,
    toggleable: true,
    width: 18,
    height: 22,
};
static BUY: ButtonLayout = icon_button(2);
static SELL: ButtonLayout = icon_button(4);
static REPAIR: ButtonLayout = icon_button(6);

impl ButtonType {
    pub const ALL: [ButtonType; 9] = [
        ButtonType::Wide,
        ButtonType::Medium,
        ButtonType::Short,
        ButtonType::Tall,
        ButtonType::Cancel,
        ButtonType::Run,
        ButtonType::Buy,
        ButtonType::Sell,
        ButtonType::Repair,
    ];

    pub fn layout(self) -> &'static ButtonLayout {
        match self {
            ButtonType::Wide => &WIDE,
            ButtonType::Medium => &MEDIUM,
            ButtonType::Short => &SHORT,
            ButtonType::Tall => &TALL,
            ButtonType::Cancel => &CANCEL,
            ButtonType::Run => &RUN,
            ButtonType::Buy => &BUY,
            ButtonType::Sell => &SELL,
            ButtonType::Repair => &REPAIR,
        }
    }
}

impl ButtonLayout {
    pub fn segments(&self, frame: usize) -> Segments {
        Segments::new(self.x_segments, self.y_segments, frame)
    }

    /// Frame blocks for Normal, Pressed, Toggled, PressedToggled, Disabled.
    /// `None` marks a state that reuses Normal.
    pub fn state_frames(&self) -> [Option<usize>; 5] {
        let base = self.base_frame;
        if !(self.has_image && self.allow_frame_change) {
            return [Some(base), None, None, None, None];
        }
        [
            Some(base),
            Some(base + PRESSED_OFFSET),
            Some(base + TOGGLED_OFFSET),
            Some(base + PRESSED_TOGGLED_OFFSET),
            self.disabled_frame,
        ]
    }
}

/// Sprite entities backing each visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSprites {
    pub normal: Entity,
    pub pressed: Entity,
    pub toggled: Entity,
    pub pressed_toggled: Entity,
    pub disabled: Entity,
}

impl StateSprites {
    pub fn all(&self) -> [Entity; 5] {
        [
            self.normal,
            self.pressed,
            self.toggled,
            self.pressed_toggled,
            self.disabled,
        ]
    }
}

/// Rendered surfaces of each visual state.
#[derive(Debug, Clone)]
pub struct StateSurfaces {
    pub normal: Arc<Surface>,
    pub pressed: Arc<Surface>,
    pub toggled: Arc<Surface>,
    pub pressed_toggled: Arc<Surface>,
    pub disabled: Arc<Surface>,
}

/// Button widget state.
#[derive(Debug, Clone)]
pub struct Button {
    pub layout: &'static ButtonLayout,
    pub sprite: Option<Arc<SpriteSheet>>,
    pub states: Option<StateSprites>,
    pub surfaces: Option<StateSurfaces>,
    pressed: bool,
    toggled: bool,
    enabled: bool,
}

impl Button {
    pub fn new(layout: &'static ButtonLayout) -> Self {
        Self {
            layout,
            sprite: None,
            states: None,
            surfaces: None,
            pressed: false,
            toggled: false,
            enabled: true,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    /// Flip the toggled state. No-op for layouts that are not toggleable.
    pub fn toggle(&mut self) {
        if self.layout.toggleable {
            self.toggled = !self.toggled;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Surface for the current state, once the state textures are copied in.
    pub fn current_surface(&self) -> Option<&Arc<Surface>> {
        let s = self.surfaces.as_ref()?;
        Some(match (self.enabled, self.pressed, self.toggled) {
            (false, _, _) => &s.disabled,
            (true, true, true) => &s.pressed_toggled,
            (true, true, false) => &s.pressed,
            (true, false, true) => &s.toggled,
            (true, false, false) => &s.normal,
        })
    }
}

impl WidgetFactory {
    /// Create a button of `button_type` at `(x, y)`.
    ///
    /// Layouts with a font get a label reading `text`; icon layouts get a
    /// placeholder entity that is `Ready` at once.
    pub fn button(
        &mut self,
        world: &mut World,
        x: f32,
        y: f32,
        button_type: ButtonType,
        text: &str,
    ) -> Entity {
        let layout = button_type.layout();
        let button = world.spawn((Button::new(layout), Transform::from_xy(x, y)));

        let label = match layout.font_path {
            Some(font) => {
                let palette = self.config.label_palette.clone();
                self.label(world, text, font, &palette)
            }
            None => world.spawn_one(crate::readiness::Ready),
        };

        let sprite = self.sprites.segmented_sprite(
            world,
            0.0,
            0.0,
            layout.sprite_path,
            layout.palette_path,
            layout.segments(layout.base_frame),
        );

        self.queues.buttons.insert(button, ButtonEntry { label, sprite });
        log::debug!("button {button} queued: {button_type:?} {text:?}");
        button
    }

    pub(super) fn process_button(&mut self, world: &mut World, button: Entity) {
        let Some(entry) = self.queues.buttons.get(&button).copied() else {
            return;
        };
        if !all_ready(world, &[entry.label, entry.sprite]) {
            return;
        }
        if !world.has::<Button>(button) {
            return;
        }

        if !world.has::<SceneGraphNode>(button) {
            world.insert(button, SceneGraphNode::default());
        }
        if let Some(sheet) = world.get::<Sprite>(entry.sprite).map(|s| Arc::clone(&s.sheet)) {
            if let Some(b) = world.get_mut::<Button>(button) {
                b.sprite = Some(sheet);
            }
            world.set_parent(entry.sprite, button);
        }
        if world.has::<super::Label>(entry.label) {
            world.set_parent(entry.label, button);
        }

        self.process_button_states(world, button);
    }

    /// Request the state sprites once, then wait for all five.
    fn process_button_states(&mut self, world: &mut World, button: Entity) {
        let Some(b) = world.get::<Button>(button) else {
            return;
        };
        let layout = b.layout;

        let states = match b.states {
            Some(states) => states,
            None => {
                let states = self.request_state_sprites(world, layout);
                if let Some(b) = world.get_mut::<Button>(button) {
                    b.states = Some(states);
                }
                states
            }
        };

        if all_ready(world, &states.all()) {
            mark_ready(world, button);
            self.queues.buttons.remove(&button);
            log::debug!("button {button} ready");
        }
    }

    fn request_state_sprites(&self, world: &mut World, layout: &'static ButtonLayout) -> StateSprites {
        let [normal_frame, pressed, toggled, pressed_toggled, disabled] = layout.state_frames();
        let mut spawn = |frame: usize| {
            self.sprites.segmented_sprite(
                world,
                0.0,
                0.0,
                layout.sprite_path,
                layout.palette_path,
                layout.segments(frame),
            )
        };

        let normal = spawn(normal_frame.unwrap_or(layout.base_frame));
        let mut or_normal = |frame: Option<usize>| frame.map_or(normal, &mut spawn);
        StateSprites {
            normal,
            pressed: or_normal(pressed),
            toggled: or_normal(toggled),
            pressed_toggled: or_normal(pressed_toggled),
            disabled: or_normal(disabled),
        }
    }

    pub(super) fn update_button(&mut self, world: &mut World, button: Entity) {
        let Some(states) = world.get::<Button>(button).and_then(|b| b.states) else {
            return;
        };
        let surface = |e: Entity| world.get::<Texture>(e).and_then(|t| t.surface.clone());
        let (Some(normal), Some(pressed), Some(toggled), Some(pressed_toggled), Some(disabled)) = (
            surface(states.normal),
            surface(states.pressed),
            surface(states.toggled),
            surface(states.pressed_toggled),
            surface(states.disabled),
        ) else {
            return;
        };

        let Some(b) = world.get_mut::<Button>(button) else {
            return;
        };
        b.surfaces = Some(StateSurfaces {
            normal,
            pressed,
            toggled,
            pressed_toggled,
            disabled,
        });
        let current = b.current_surface().cloned();

        let unchanged = world
            .get::<Texture>(button)
            .is_some_and(|t| t.surface_id() == current.as_ref().map(|s| s.id()));
        if !unchanged {
            world.insert(button, Texture { surface: current });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_base_frame() {
        assert_eq!(
            ButtonType::Sell.layout().state_frames(),
            [Some(4), Some(5), Some(6), Some(7), None]
        );
    }

    #[test]
    fn cancel_has_distinct_disabled_frame() {
        assert_eq!(ButtonType::Cancel.layout().state_frames()[4], Some(0));
    }

    #[test]
    fn static_layout_aliases_everything() {
        let layout = ButtonLayout {
            allow_frame_change: false,
            disabled_frame: Some(9),
            ..ButtonType::Medium.layout().clone()
        };
        assert_eq!(layout.state_frames(), [Some(0), None, None, None, None]);
    }

    #[test]
    fn every_type_has_a_layout() {
        for ty in ButtonType::ALL {
            let layout = ty.layout();
            assert!(layout.sprite_path.starts_with("/data/global/ui/"));
            assert!(layout.x_segments >= 1 && layout.y_segments >= 1);
        }
    }

    #[test]
    fn toggle_respects_layout() {
        let mut run = Button::new(ButtonType::Run.layout());
        run.toggle();
        assert!(run.is_toggled());

        let mut wide = Button::new(ButtonType::Wide.layout());
        wide.toggle();
        assert!(!wide.is_toggled());
    }

    #[test]
    fn current_surface_tracks_state() {
        let surfaces: Vec<Arc<Surface>> = (0..5).map(|_| Arc::new(Surface::new(1, 1))).collect();
        let mut b = Button::new(ButtonType::Run.layout());
        assert!(b.current_surface().is_none());

        b.surfaces = Some(StateSurfaces {
            normal: Arc::clone(&surfaces[0]),
            pressed: Arc::clone(&surfaces[1]),
            toggled: Arc::clone(&surfaces[2]),
            pressed_toggled: Arc::clone(&surfaces[3]),
            disabled: Arc::clone(&surfaces[4]),
        });
        let id = |b: &Button| b.current_surface().map(|s| s.id());

        assert_eq!(id(&b), Some(surfaces[0].id()));
        b.set_pressed(true);
        assert_eq!(id(&b), Some(surfaces[1].id()));
        b.toggle();
        assert_eq!(id(&b), Some(surfaces[3].id()));
        b.set_pressed(false);
        assert_eq!(id(&b), Some(surfaces[2].id()));
        assert!(b.is_enabled());
        b.set_enabled(false);
        assert!(!b.is_enabled());
        assert_eq!(id(&b), Some(surfaces[4].id()));
    }
}
