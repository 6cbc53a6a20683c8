//! Label widgets.
//!
//! A label is text drawn with a bitmap font. Creating one spawns the label
//! entity, a glyph-table entity carrying a `File` locator, and a sprite
//! request for the glyph sheet. Once both are ready the font is taken from
//! the cache or built, the table entity is dropped, and the label becomes
//! `Ready`. From then on the update pass re-renders it whenever its text or
//! background changes.

use std::sync::Arc;

use super::WidgetFactory;
use super::queue::LabelEntry;
use crate::asset::File;
use crate::ecs::{Entity, World};
use crate::font::{BitmapFont, BitmapFontHandle, FontKey, FontTable};
use crate::readiness::{all_ready, mark_ready};
use crate::render::{Color, Renderer, Surface, Texture};
use crate::sprite::Sprite;

/// Text widget state.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    font: Option<Arc<BitmapFont>>,
    background: Color,
    dirty: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
            background: Color::TRANSPARENT,
            dirty: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.dirty = true;
        }
    }

    pub fn font(&self) -> Option<&Arc<BitmapFont>> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: Arc<BitmapFont>) {
        if self.font.as_ref().is_some_and(|f| Arc::ptr_eq(f, &font)) {
            return;
        }
        self.font = Some(font);
        self.dirty = true;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        if color != self.background {
            self.background = color;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Pixel size of the rendered text; zero without a font.
    pub fn size(&self) -> (u32, u32) {
        self.font.as_ref().map_or((0, 0), |f| f.measure(&self.text))
    }

    /// Draw into a fresh surface from `renderer` and clear the dirty flag.
    /// `None` until a font is set.
    pub fn render(&mut self, renderer: &dyn Renderer) -> Option<Surface> {
        let font = self.font.as_ref()?;
        let (w, h) = font.measure(&self.text);
        let mut surface = renderer.new_surface(w.max(1), h.max(1));
        surface.fill(self.background);
        font.render(&self.text, &mut surface);
        self.dirty = false;
        Some(surface)
    }
}

impl WidgetFactory {
    /// Create a label drawn with the font stem `font` in `palette`.
    ///
    /// Returns at once; the label becomes `Ready` on a later tick.
    pub fn label(&mut self, world: &mut World, text: &str, font: &str, palette: &str) -> Entity {
        let table_path = format!("{font}{}", self.config.glyph_table_extension);
        let sprite_path = format!("{font}{}", self.config.glyph_sprite_extension);

        let label = world.spawn_one(Label::new(text));
        let table = world.spawn_one(File::new(table_path));
        let sprite = self.sprites.sprite(world, 0.0, 0.0, &sprite_path, palette);

        self.queues.labels.insert(label, LabelEntry { table, sprite });
        log::debug!("label {label} queued: {text:?} in {font}");
        label
    }

    pub(super) fn process_label(&mut self, world: &mut World, label: Entity) {
        let Some(entry) = self.queues.labels.get(&label).copied() else {
            return;
        };

        if !world.has::<BitmapFontHandle>(label) {
            self.attach_font(world, label, entry);
        }
        let Some(font) = world.get::<BitmapFontHandle>(label).map(|h| Arc::clone(&h.0)) else {
            return;
        };

        if let Some(renderer) = self.gate.renderer() {
            font.bind_renderer(Arc::clone(renderer));
        }
        match world.get_mut::<Label>(label) {
            Some(l) => l.set_font(font),
            None => {
                let mut l = Label::new("");
                l.set_font(font);
                world.insert(label, l);
            }
        }

        world.despawn(entry.table);
        mark_ready(world, label);
        self.queues.labels.remove(&label);
        log::debug!("label {label} ready");
    }

    /// Take the font for `entry` from the cache, or build and cache it.
    fn attach_font(&mut self, world: &mut World, label: Entity, entry: LabelEntry) {
        if !all_ready(world, &[entry.table, entry.sprite]) {
            return;
        }
        let Some(table_path) = world.get::<File>(entry.table).map(|f| f.path.clone()) else {
            return;
        };
        let Some(sprite) = world.get::<Sprite>(entry.sprite) else {
            return;
        };
        let key = FontKey::new(table_path, sprite.path.clone(), sprite.palette_path.clone());

        let font = match self.font_cache.retrieve(&key) {
            Some(font) => font,
            None => {
                let Some(font) = self.build_font(world, entry, &key) else {
                    return;
                };
                self.fonts_built += 1;
                if let Err(err) = self.font_cache.insert(key, Arc::clone(&font), 1) {
                    log::warn!("font cache rejected insert: {err}");
                }
                font
            }
        };
        world.insert(label, BitmapFontHandle(font));
    }

    fn build_font(&mut self, world: &World, entry: LabelEntry, key: &FontKey) -> Option<Arc<BitmapFont>> {
        let table = world.get::<FontTable>(entry.table)?;
        let sprite = world.get::<Sprite>(entry.sprite)?;

        match BitmapFont::new(Arc::clone(&sprite.sheet), &table.data, Color::WHITE) {
            Ok(font) => {
                log::debug!("built bitmap font {key}");
                Some(Arc::new(font))
            }
            Err(err) => {
                if self.font_failures.insert(key.clone()) {
                    log::warn!("cannot build bitmap font {key}: {err}");
                }
                None
            }
        }
    }

    pub(super) fn update_label(&mut self, world: &mut World, label: Entity) {
        let Some(font) = world.get::<BitmapFontHandle>(label).map(|h| Arc::clone(&h.0)) else {
            return;
        };
        let background = world.get::<Color>(label).copied();
        let Some(renderer) = self.gate.renderer().cloned() else {
            return;
        };
        let Some(l) = world.get_mut::<Label>(label) else {
            return;
        };

        l.set_font(font);
        if let Some(color) = background {
            l.set_background(color);
        }
        if !l.is_dirty() {
            return;
        }
        let Some(surface) = l.render(renderer.as_ref()) else {
            return;
        };
        world.insert(label, Texture::new(Arc::new(surface)));
    }
}
