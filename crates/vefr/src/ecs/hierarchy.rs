//! # Scene Graph: Non-Owning Display Hierarchy
//!
//! A button's sprite and label are linked under the button so they follow it
//! around the screen. The link never owns anything: [`SceneGraphNode`] is a
//! plain back reference, [`Children`] a plain list, and despawning a child
//! does not chase either side.
//!
//! ```ignore
//! let button = world.spawn((Transform::from_xy(100.0, 100.0),));
//! let sprite = world.spawn((Transform::default(),));
//! world.set_parent(sprite, button);
//!
//! propagate_transforms(&mut world);
//! ```

use std::collections::VecDeque;

use crate::ecs::Entity;
use crate::ecs::world::World;
use crate::math::{Mat4, Transform};

/// Position of an entity in the display hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneGraphNode {
    pub parent: Option<Entity>,
}

/// Entities linked below this one.
#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<Entity>);

/// World-space transform computed by [`propagate_transforms`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTransform {
    pub matrix: Mat4,
}

impl GlobalTransform {
    /// Screen-space position (x, y) of the entity.
    pub fn position(&self) -> (f32, f32) {
        let col = self.matrix.col(3);
        (col.x, col.y)
    }
}

/// Push local transforms down the scene graph.
///
/// Roots are entities with a `Transform` and no live parent. Children without
/// a `Transform` of their own inherit the parent's matrix unchanged. BFS keeps
/// parents ahead of their children.
pub fn propagate_transforms(world: &mut World) {
    let mut roots = Vec::new();
    world.query::<(&Transform,)>(|entity, (transform,)| {
        roots.push((entity, transform.matrix()));
    });

    let mut queue: VecDeque<(Entity, Mat4)> = VecDeque::new();
    for (entity, matrix) in roots {
        let parent = world.get::<SceneGraphNode>(entity).and_then(|n| n.parent);
        if parent.is_some_and(|p| world.is_alive(p)) {
            continue;
        }
        queue.push_back((entity, matrix));
    }

    while let Some((entity, matrix)) = queue.pop_front() {
        world.insert(entity, GlobalTransform { matrix });

        let Some(children) = world.get::<Children>(entity) else {
            continue;
        };
        for child in children.0.clone() {
            if !world.is_alive(child) {
                continue;
            }
            let local = world
                .get::<Transform>(child)
                .map(|t| t.matrix())
                .unwrap_or(Mat4::IDENTITY);
            queue.push_back((child, matrix * local));
        }
    }
}
