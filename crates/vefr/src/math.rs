//! Math types and glam re-exports.
//!
//! Widgets live in screen pixels with (0,0) at the top-left corner. The
//! [`Transform`] keeps the full 3D form so scene-graph propagation can use
//! plain matrix products; widgets only ever touch x and y.

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Position, rotation and scale of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// A transform at the given screen position.
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, 0.0),
            ..Self::IDENTITY
        }
    }

    /// Move by `(dx, dy)` pixels.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.translation += Vec3::new(dx, dy, 0.0);
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An axis-aligned pixel rectangle.
///
/// Used for clickable areas. `min` is inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// The same rectangle shifted by `offset`.
    pub fn offset(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
