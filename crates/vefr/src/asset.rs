//! # Asset Loading
//!
//! The reference loader that turns locators into decoded payloads.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  AssetLoader (resource in World)                        │
//! │                                                         │
//! │  source ── where bytes come from (memory, directory)    │
//! │  failed ── entities whose load already failed           │
//! └─────────────────────────────────────────────────────────┘
//!
//! Per tick: load_assets(world)
//!   File { path: "*.tbl" }  → + FontTable { data } + Ready
//!   SpriteRequest { .. }    → + Sprite + Texture + Ready
//! ```
//!
//! A failed load is logged once and the entity stays unready. Whatever was
//! waiting on it stays queued; nothing is retried until the entity is
//! respawned.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::ecs::{Entity, World};
use crate::font::FontTable;
use crate::readiness::{Ready, mark_ready};
use crate::render::Texture;
use crate::sprite::{Sprite, SpriteRequest, SpriteSheet};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{path}` not found")]
    NotFound { path: String },

    #[error("cannot read asset `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("sprite `{path}` has {cells} cells, frame {frame} needs more")]
    FrameOutOfRange { path: String, frame: usize, cells: usize },
}

/// Component: a resource locator, not the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: String,
}

impl File {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Where asset bytes come from.
pub trait AssetSource: Send + Sync {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// In-memory files keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files.get(path).cloned().ok_or_else(|| AssetError::NotFound {
            path: path.to_string(),
        })
    }
}

/// Files under a root directory. Game paths like `/data/global/ui/x.dc6`
/// resolve relative to the root.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path.trim_start_matches('/')))
    }
}

impl AssetSource for DirSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound {
                path: path.to_string(),
            },
            _ => AssetError::Io {
                path: path.to_string(),
                source,
            },
        })
    }
}

/// Resource: decodes pending `File` and `SpriteRequest` entities.
pub struct AssetLoader {
    source: Box<dyn AssetSource>,
    table_extension: String,
    failed: HashSet<Entity>,
}

impl AssetLoader {
    pub fn new(source: impl AssetSource + 'static, table_extension: impl Into<String>) -> Self {
        Self {
            source: Box::new(source),
            table_extension: table_extension.into(),
            failed: HashSet::new(),
        }
    }

    /// Number of entities whose load failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    fn load_table(&self, path: &str) -> Result<FontTable, AssetError> {
        let data = self.source.read(path)?;
        Ok(FontTable { data })
    }

    fn load_sprite(&self, request: &SpriteRequest) -> Result<(Sprite, Texture), AssetError> {
        let path = &request.image_path;
        let bytes = self.source.read(path)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();

        let sheet = Arc::new(SpriteSheet::from_strip(&image));
        let sprite = Sprite {
            sheet,
            path: path.clone(),
            palette_path: request.palette_path.clone(),
            segments: request.segments,
            current_frame: request.segments.base_frame,
        };
        let surface = sprite.current_surface().ok_or_else(|| AssetError::FrameOutOfRange {
            path: path.clone(),
            frame: request.segments.base_frame,
            cells: sprite.sheet.frame_count(),
        })?;
        Ok((sprite, Texture::new(Arc::new(surface))))
    }

    fn fail(&mut self, entity: Entity, err: AssetError) {
        if self.failed.insert(entity) {
            log::warn!("asset load for {entity} failed: {err}");
        }
    }
}

/// System: load every pending glyph table and sprite.
pub fn load_assets(world: &mut World) {
    let Some(mut loader) = world.resource_remove::<AssetLoader>() else {
        return;
    };
    loader.failed.retain(|&e| world.is_alive(e));

    for entity in world.entities_with::<File>() {
        if world.has::<Ready>(entity) || loader.failed.contains(&entity) {
            continue;
        }
        let Some(path) = world.get::<File>(entity).map(|f| f.path.clone()) else {
            continue;
        };
        if !path.ends_with(&loader.table_extension) {
            continue;
        }
        match loader.load_table(&path) {
            Ok(table) => {
                log::debug!("loaded glyph table {path} ({} bytes)", table.data.len());
                world.insert(entity, table);
                mark_ready(world, entity);
            }
            Err(err) => loader.fail(entity, err),
        }
    }

    for entity in world.entities_with::<SpriteRequest>() {
        if world.has::<Sprite>(entity) || loader.failed.contains(&entity) {
            continue;
        }
        let Some(request) = world.get::<SpriteRequest>(entity).cloned() else {
            continue;
        };
        match loader.load_sprite(&request) {
            Ok((sprite, texture)) => {
                log::debug!(
                    "loaded sprite {} frame {} for {entity}",
                    request.image_path,
                    request.segments.base_frame
                );
                world.insert(entity, sprite);
                world.insert(entity, texture);
                mark_ready(world, entity);
            }
            Err(err) => loader.fail(entity, err),
        }
    }

    world.insert_resource(loader);
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>, AssetError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|source| AssetError::Decode {
            path: "<memory>".to_string(),
            source,
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::is_ready;
    use crate::sprite::{Segments, SpriteFactory, SpriteSource};
    use image::{Rgba, RgbaImage};

    fn png(cells: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(4 * cells, 4, Rgba([9, 9, 9, 255]))).unwrap()
    }

    fn world_with(source: MemorySource) -> World {
        let mut world = World::new();
        world.insert_resource(AssetLoader::new(source, ".tbl"));
        world
    }

    #[test]
    fn loads_glyph_table() {
        let mut world = world_with(MemorySource::new().with("font.tbl", vec![1, 2, 3]));
        let table = world.spawn_one(File::new("font.tbl"));

        load_assets(&mut world);
        assert!(is_ready(&world, table));
        assert_eq!(world.get::<FontTable>(table).unwrap().data, vec![1, 2, 3]);
    }

    #[test]
    fn ignores_files_with_other_extensions() {
        let mut world = world_with(MemorySource::new().with("font.txt", vec![1]));
        let other = world.spawn_one(File::new("font.txt"));

        load_assets(&mut world);
        assert!(!is_ready(&world, other));
    }

    #[test]
    fn loads_segmented_sprite() {
        let mut world = world_with(MemorySource::new().with("btn.png", png(8)));
        let e = SpriteFactory.segmented_sprite(&mut world, 0.0, 0.0, "btn.png", "pal", Segments::new(2, 1, 1));

        load_assets(&mut world);
        assert!(is_ready(&world, e));
        let texture = world.get::<Texture>(e).unwrap();
        assert_eq!(texture.surface.as_ref().unwrap().size(), (8, 4));
        assert_eq!(world.get::<Sprite>(e).unwrap().sheet.frame_count(), 8);
    }

    #[test]
    fn missing_asset_stays_unready_and_is_logged_once() {
        let mut world = world_with(MemorySource::new());
        let e = SpriteFactory.sprite(&mut world, 0.0, 0.0, "missing.png", "pal");

        load_assets(&mut world);
        load_assets(&mut world);
        assert!(!is_ready(&world, e));
        assert_eq!(world.resource::<AssetLoader>().failed_count(), 1);
    }

    #[test]
    fn frame_past_end_fails() {
        let mut world = world_with(MemorySource::new().with("btn.png", png(2)));
        let e = SpriteFactory.segmented_sprite(&mut world, 0.0, 0.0, "btn.png", "pal", Segments::new(1, 1, 5));

        load_assets(&mut world);
        assert!(!is_ready(&world, e));
    }

    #[test]
    fn dir_source_strips_leading_slash() {
        let dir = std::env::temp_dir().join(format!("vefr-asset-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("data")).unwrap();
        std::fs::write(dir.join("data/x.tbl"), b"abc").unwrap();

        let source = DirSource::new(&dir);
        assert_eq!(source.read("/data/x.tbl").unwrap(), b"abc");
        assert!(matches!(source.read("/data/y.tbl"), Err(AssetError::NotFound { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
