//! # Sprites
//!
//! A sprite sheet is one image sliced into equally sized frames. Widgets ask
//! for sprites through a [`SpriteSource`]; the call returns an entity at once
//! and the loader fills it in on some later tick:
//!
//! ```text
//! tick N     segmented_sprite("buysellbtn", 1x1, base 2)
//!              → entity { Transform, SpriteRequest }
//! tick N+k   load_assets decodes the sheet
//!              → entity { Transform, SpriteRequest, Sprite, Texture, Ready }
//! ```
//!
//! A *segmented* sprite draws one logical frame made of `x * y` cells laid
//! out in a grid. Logical frame `f` uses cells `f*x*y .. (f+1)*x*y`, row by
//! row. Plain sprites are the 1x1 case.

use std::sync::Arc;

use image::RgbaImage;

use crate::ecs::{Entity, World};
use crate::math::Transform;
use crate::render::Surface;

/// Grid layout of a segmented sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segments {
    pub x: u32,
    pub y: u32,
    /// Logical frame shown when the sprite is first loaded.
    pub base_frame: usize,
}

impl Segments {
    pub const SINGLE: Self = Self {
        x: 1,
        y: 1,
        base_frame: 0,
    };

    pub fn new(x: u32, y: u32, base_frame: usize) -> Self {
        Self { x, y, base_frame }
    }

    /// Cells per logical frame.
    pub fn cells(&self) -> usize {
        (self.x * self.y) as usize
    }
}

impl Default for Segments {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Decoded frames of one sheet.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub frames: Vec<Arc<Surface>>,
}

impl SpriteSheet {
    pub fn new(frames: Vec<Arc<Surface>>) -> Self {
        Self { frames }
    }

    /// Slice a horizontal strip of square cells. The cell side is the image
    /// height; a trailing partial cell is dropped.
    pub fn from_strip(image: &RgbaImage) -> Self {
        let side = image.height();
        if side == 0 {
            return Self::new(Vec::new());
        }
        let count = image.width() / side;
        let frames = (0..count)
            .map(|i| {
                let cell = image::imageops::crop_imm(image, i * side, 0, side, side).to_image();
                Arc::new(Surface::from_image(cell))
            })
            .collect();
        Self::new(frames)
    }

    pub fn frame(&self, index: usize) -> Option<&Arc<Surface>> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Stitch logical frame `frame` of a segmented layout into one surface.
    /// `None` if the sheet has too few cells.
    pub fn compose(&self, segments: Segments, frame: usize) -> Option<Surface> {
        if segments.cells() == 0 {
            return None;
        }
        let first = frame * segments.cells();
        let cells = self.frames.get(first..first + segments.cells())?;
        if segments.cells() == 1 {
            return Some(Surface::from_image(cells[0].image.clone()));
        }

        let (cw, ch) = cells[0].size();
        let mut out = Surface::new(cw * segments.x, ch * segments.y);
        for (i, cell) in cells.iter().enumerate() {
            let col = i as u32 % segments.x;
            let row = i as u32 / segments.x;
            out.blit(cell, i64::from(col * cw), i64::from(row * ch));
        }
        Some(out)
    }
}

/// A loaded sprite.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub sheet: Arc<SpriteSheet>,
    pub path: String,
    pub palette_path: String,
    pub segments: Segments,
    pub current_frame: usize,
}

impl Sprite {
    /// The current logical frame as a fresh surface.
    pub fn current_surface(&self) -> Option<Surface> {
        self.sheet.compose(self.segments, self.current_frame)
    }
}

/// Pending sprite load, consumed by the asset loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRequest {
    pub image_path: String,
    pub palette_path: String,
    pub segments: Segments,
}

/// Anything able to create sprite entities on demand.
pub trait SpriteSource {
    /// A single-cell sprite at `(x, y)`.
    fn sprite(&self, world: &mut World, x: f32, y: f32, image: &str, palette: &str) -> Entity {
        self.segmented_sprite(world, x, y, image, palette, Segments::SINGLE)
    }

    /// A segmented sprite at `(x, y)`.
    fn segmented_sprite(
        &self,
        world: &mut World,
        x: f32,
        y: f32,
        image: &str,
        palette: &str,
        segments: Segments,
    ) -> Entity;
}

/// Spawns [`SpriteRequest`] entities for the asset loader to fill in.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpriteFactory;

impl SpriteSource for SpriteFactory {
    fn segmented_sprite(
        &self,
        world: &mut World,
        x: f32,
        y: f32,
        image: &str,
        palette: &str,
        segments: Segments,
    ) -> Entity {
        let entity = world.spawn((
            Transform::from_xy(x, y),
            SpriteRequest {
                image_path: image.to_string(),
                palette_path: palette.to_string(),
                segments,
            },
        ));
        log::trace!("sprite {entity} requested: {image} ({}x{}, frame {})", segments.x, segments.y, segments.base_frame);
        entity
    }
}
