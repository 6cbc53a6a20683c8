//! Convenience re-exports. `use vefr::prelude::*` for the common items.

pub use crate::app::{App, Plugin};
pub use crate::asset::{AssetLoader, AssetSource, DirSource, File, MemorySource};
pub use crate::cache::{CacheError, ResourceCache};
pub use crate::config::PipelineConfig;
pub use crate::ecs::{Children, Entity, Filter, SceneGraphNode, Schedule, System, World};
pub use crate::font::{BitmapFont, BitmapFontHandle, FontKey};
pub use crate::input::{CursorPosition, Input, MouseButton};
pub use crate::logging::init_logger;
pub use crate::math::{Mat4, Rect, Transform, Vec2};
pub use crate::readiness::{Ready, is_ready};
pub use crate::render::{Color, RenderSystem, Renderer, SoftwareRenderer, Surface, Texture};
pub use crate::scene::SceneState;
pub use crate::sprite::{Segments, Sprite, SpriteSource};
pub use crate::time::Time;
pub use crate::widget::{
    Button, ButtonType, Checkbox, Interactive, Label, WidgetFactory, WidgetPlugin, with_factory,
};
#[cfg(feature = "diagnostics")]
pub use crate::diag::{DiagSender, PipelineSnapshot};
