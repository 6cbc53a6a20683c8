//! # Render Collaborator
//!
//! The widget pipeline never draws to a window itself. It needs three things
//! from the render side:
//!
//! - a [`RenderSystem`] resource whose `renderer` slot is filled once a
//!   backend is up (the boot gate waits for it),
//! - `new_surface(width, height)` to allocate a drawing target,
//! - [`Texture`] components through which widgets publish what they want
//!   drawn this tick.
//!
//! [`SoftwareRenderer`] is the CPU backend used headless and in tests.
//! Surfaces are plain RGBA images; a GPU backend uploads them when it sees a
//! new surface id.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{Rgba, RgbaImage};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// A drawing target.
///
/// Every surface gets a process-unique id at creation. Surfaces are shared as
/// `Arc<Surface>` once drawn; two handles to the same pixels compare equal by
/// id.
#[derive(Debug, Clone)]
pub struct Surface {
    id: u64,
    pub image: RgbaImage,
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            image,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn fill(&mut self, color: Color) {
        let px = color.to_rgba();
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Alpha-blend `src` onto this surface with its top-left corner at `(x, y)`.
    /// Parts falling outside are clipped.
    pub fn blit(&mut self, src: &Surface, x: i64, y: i64) {
        image::imageops::overlay(&mut self.image, &src.image, x, y);
    }

    /// Copy `src` over this surface, tinting every pixel by `tint`.
    /// Only pixels with non-zero alpha are written.
    pub fn blit_tinted(&mut self, src: &Surface, x: i64, y: i64, tint: Color) {
        let (w, h) = self.size();
        for (sx, sy, px) in src.image.enumerate_pixels() {
            if px[3] == 0 {
                continue;
            }
            let dx = x + i64::from(sx);
            let dy = y + i64::from(sy);
            if dx < 0 || dy < 0 || dx >= i64::from(w) || dy >= i64::from(h) {
                continue;
            }
            let mul = |c: u8, t: u8| ((u16::from(c) * u16::from(t)) / 255) as u8;
            self.image.put_pixel(
                dx as u32,
                dy as u32,
                Rgba([
                    mul(px[0], tint.r),
                    mul(px[1], tint.g),
                    mul(px[2], tint.b),
                    mul(px[3], tint.a),
                ]),
            );
        }
    }
}

/// A backend able to hand out surfaces.
pub trait Renderer: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    fn new_surface(&self, width: u32, height: u32) -> Surface;
}

/// CPU renderer. Surfaces are plain images.
#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    allocated: AtomicU64,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces handed out so far.
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }
}

impl Renderer for SoftwareRenderer {
    fn name(&self) -> &str {
        "software"
    }

    fn new_surface(&self, width: u32, height: u32) -> Surface {
        self.allocated.fetch_add(1, Ordering::Relaxed);
        Surface::new(width, height)
    }
}

/// Resource: the active render backend, once one is bound.
#[derive(Default, Clone)]
pub struct RenderSystem {
    pub renderer: Option<Arc<dyn Renderer>>,
}

impl RenderSystem {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// A render system whose backend has not come up yet.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, renderer: Arc<dyn Renderer>) {
        log::info!("render system bound to `{}` renderer", renderer.name());
        self.renderer = Some(renderer);
    }
}

/// What an entity wants drawn this tick.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub surface: Option<Arc<Surface>>,
}

impl Texture {
    pub fn new(surface: Arc<Surface>) -> Self {
        Self {
            surface: Some(surface),
        }
    }

    /// Id of the held surface, if any.
    pub fn surface_id(&self) -> Option<u64> {
        self.surface.as_ref().map(|s| s.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_ids_are_unique() {
        let renderer = SoftwareRenderer::new();
        let a = renderer.new_surface(4, 4);
        let b = renderer.new_surface(4, 4);
        assert_ne!(a.id(), b.id());
        assert_eq!(renderer.allocated(), 2);
        assert_eq!(a.size(), (4, 4));
    }

    #[test]
    fn blit_tinted_clips_and_skips_transparent() {
        let mut glyph = Surface::new(2, 2);
        glyph.image.put_pixel(0, 0, Rgba([255, 255, 255, 255]));

        let mut target = Surface::new(3, 3);
        target.blit_tinted(&glyph, 2, 2, Color::rgba(255, 0, 0, 255));
        target.blit_tinted(&glyph, 5, 5, Color::WHITE);

        assert_eq!(target.image.get_pixel(2, 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(target.image.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn fill_sets_every_pixel() {
        let mut s = Surface::new(2, 1);
        s.fill(Color::BLACK);
        assert!(s.image.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn render_system_starts_unbound() {
        let mut rs = RenderSystem::unbound();
        assert!(rs.renderer.is_none());
        rs.bind(Arc::new(SoftwareRenderer::new()));
        assert!(rs.renderer.is_some());
    }
}
