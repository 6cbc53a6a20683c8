//! # Bitmap Fonts
//!
//! A bitmap font is two files sharing a stem: a glyph table (`.tbl`) and a
//! sprite sheet (`.dc6`) holding one frame per glyph. For the stem
//! `/data/local/FONT/ENG/fontexocet10` the pipeline loads
//! `fontexocet10.tbl` and `fontexocet10.dc6`.
//!
//! ## Glyph table layout
//!
//! ```text
//! offset  size  field
//! 0       5     signature "Woo!\x01"
//! 5       7     header remainder (ignored)
//! 12      14*n  glyph records
//!
//! glyph record
//! 0       2     code point (u16 LE)
//! 2       1     (ignored)
//! 3       1     advance width
//! 4       1     height
//! 5       3     (ignored)
//! 8       2     frame index in the sheet (u16 LE)
//! 10      4     (ignored)
//! ```
//!
//! A built [`BitmapFont`] is immutable and shared through `Arc` by every
//! label using the same (table, sprite, palette) triple.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::render::{Color, Renderer, Surface};
use crate::sprite::SpriteSheet;

const SIGNATURE: &[u8] = b"Woo!\x01";
const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontError {
    #[error("glyph table signature mismatch")]
    BadSignature,

    #[error("glyph table truncated: {len} bytes is not a header plus whole records")]
    Truncated { len: usize },

    #[error("glyph {code:#06x} points at frame {frame}, sheet has {frames} frames")]
    MissingFrame { code: u16, frame: usize, frames: usize },
}

/// Metrics of one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    pub frame: usize,
}

/// Parsed glyph table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphTable {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphTable {
    pub fn parse(data: &[u8]) -> Result<Self, FontError> {
        if !data.starts_with(SIGNATURE) {
            return Err(FontError::BadSignature);
        }
        if data.len() < HEADER_LEN || (data.len() - HEADER_LEN) % RECORD_LEN != 0 {
            return Err(FontError::Truncated { len: data.len() });
        }

        let glyphs = data[HEADER_LEN..]
            .chunks_exact(RECORD_LEN)
            .filter_map(|rec| {
                let code = u16::from_le_bytes([rec[0], rec[1]]);
                let ch = char::from_u32(u32::from(code))?;
                Some((
                    ch,
                    Glyph {
                        width: u32::from(rec[3]),
                        height: u32::from(rec[4]),
                        frame: usize::from(u16::from_le_bytes([rec[8], rec[9]])),
                    },
                ))
            })
            .collect();
        Ok(Self { glyphs })
    }

    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Raw glyph-table bytes, attached by the asset loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    pub data: Vec<u8>,
}

/// A renderable font: glyph metrics plus the glyph sheet.
pub struct BitmapFont {
    sheet: Arc<SpriteSheet>,
    table: GlyphTable,
    color: Color,
    renderer: OnceLock<Arc<dyn Renderer>>,
}

impl fmt::Debug for BitmapFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapFont")
            .field("glyphs", &self.table.len())
            .field("frames", &self.sheet.frame_count())
            .field("color", &self.color)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl BitmapFont {
    /// Build a font from the glyph sheet and raw table bytes.
    pub fn new(sheet: Arc<SpriteSheet>, table_data: &[u8], color: Color) -> Result<Self, FontError> {
        let table = GlyphTable::parse(table_data)?;
        let frames = sheet.frame_count();
        for (&ch, glyph) in &table.glyphs {
            if glyph.frame >= frames {
                return Err(FontError::MissingFrame {
                    code: ch as u16,
                    frame: glyph.frame,
                    frames,
                });
            }
        }
        Ok(Self {
            sheet,
            table,
            color,
            renderer: OnceLock::new(),
        })
    }

    /// Attach the renderer the font draws for. The first binding wins; the
    /// font is shared, so rebinding would change it under other labels.
    pub fn bind_renderer(&self, renderer: Arc<dyn Renderer>) {
        if self.renderer.set(renderer).is_err() {
            log::trace!("bitmap font already bound");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.renderer.get().is_some()
    }

    pub fn renderer(&self) -> Option<&Arc<dyn Renderer>> {
        self.renderer.get()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    /// Pixel size of `text`: widest line by summed line heights. Characters
    /// missing from the table take no space.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let mut width = 0;
        let mut height = 0;
        for line in text.split('\n') {
            let (w, h) = line
                .chars()
                .filter_map(|c| self.table.get(c))
                .fold((0, 0), |(w, h), g| (w + g.width, h.max(g.height)));
            width = width.max(w);
            height += h;
        }
        (width, height)
    }

    /// Draw `text` onto `target` starting at its top-left corner.
    pub fn render(&self, text: &str, target: &mut Surface) {
        let mut y = 0i64;
        for line in text.split('\n') {
            let mut x = 0i64;
            let mut line_height = 0;
            for glyph in line.chars().filter_map(|c| self.table.get(c)) {
                if let Some(frame) = self.sheet.frame(glyph.frame) {
                    target.blit_tinted(frame, x, y, self.color);
                }
                x += i64::from(glyph.width);
                line_height = line_height.max(glyph.height);
            }
            y += i64::from(line_height);
        }
    }
}

/// Content key of a cached font: the glyph table, sprite and palette paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub table: String,
    pub sprite: String,
    pub palette: String,
}

impl FontKey {
    pub fn new(table: impl Into<String>, sprite: impl Into<String>, palette: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sprite: sprite.into(),
            palette: palette.into(),
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.table, self.sprite, self.palette)
    }
}

/// Component: the font a label draws with.
#[derive(Debug, Clone)]
pub struct BitmapFontHandle(pub Arc<BitmapFont>);

/// Encode a glyph table. Used by demos and tests to fabricate font files.
pub fn encode_glyph_table(glyphs: &[(char, Glyph)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + glyphs.len() * RECORD_LEN);
    out.extend_from_slice(SIGNATURE);
    out.resize(HEADER_LEN, 0);
    for (ch, g) in glyphs {
        let code = *ch as u16;
        let frame = g.frame as u16;
        out.extend_from_slice(&code.to_le_bytes());
        out.push(0);
        out.push(g.width as u8);
        out.push(g.height as u8);
        out.extend_from_slice(&[0; 3]);
        out.extend_from_slice(&frame.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SoftwareRenderer;
    use image::{Rgba, RgbaImage};

    fn sheet(frames: u32) -> Arc<SpriteSheet> {
        let strip = RgbaImage::from_pixel(8 * frames, 8, Rgba([255, 255, 255, 255]));
        Arc::new(SpriteSheet::from_strip(&strip))
    }

    fn table() -> Vec<u8> {
        encode_glyph_table(&[
            ('T', Glyph { width: 6, height: 8, frame: 0 }),
            ('e', Glyph { width: 5, height: 7, frame: 1 }),
            ('s', Glyph { width: 4, height: 7, frame: 2 }),
            ('t', Glyph { width: 3, height: 8, frame: 3 }),
        ])
    }

    #[test]
    fn parses_records() {
        let t = GlyphTable::parse(&table()).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.get('e'), Some(&Glyph { width: 5, height: 7, frame: 1 }));
        assert!(t.get('x').is_none());
    }

    #[test]
    fn rejects_bad_signature_and_truncation() {
        assert_eq!(GlyphTable::parse(b"Nope!"), Err(FontError::BadSignature));

        let mut data = table();
        data.pop();
        assert!(matches!(GlyphTable::parse(&data), Err(FontError::Truncated { .. })));
    }

    #[test]
    fn missing_frame_is_an_error() {
        let err = BitmapFont::new(sheet(2), &table(), Color::WHITE).unwrap_err();
        assert!(matches!(err, FontError::MissingFrame { frames: 2, .. }));
    }

    #[test]
    fn measure_sums_widths_and_lines() {
        let font = BitmapFont::new(sheet(4), &table(), Color::WHITE).unwrap();
        assert_eq!(font.measure("Test"), (18, 8));
        assert_eq!(font.measure("Te\nst"), (11, 16));
        assert_eq!(font.measure("??"), (0, 0));
    }

    #[test]
    fn render_draws_tinted_glyphs() {
        let font = BitmapFont::new(sheet(4), &table(), Color::rgba(255, 0, 0, 255)).unwrap();
        let (w, h) = font.measure("Test");
        let mut surface = Surface::new(w, h);
        font.render("Test", &mut surface);
        assert_eq!(surface.image.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn first_binding_wins() {
        let font = BitmapFont::new(sheet(4), &table(), Color::WHITE).unwrap();
        assert!(!font.is_bound());
        let first: Arc<dyn Renderer> = Arc::new(SoftwareRenderer::new());
        font.bind_renderer(Arc::clone(&first));
        font.bind_renderer(Arc::new(SoftwareRenderer::new()));
        assert!(Arc::ptr_eq(font.renderer().unwrap(), &first));
    }

    #[test]
    fn key_display_joins_with_double_colon() {
        let key = FontKey::new("F.tbl", "F.dc6", "P");
        assert_eq!(key.to_string(), "F.tbl::F.dc6::P");
    }
}
