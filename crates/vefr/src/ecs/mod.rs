//! # Archetype ECS
//!
//! The entity/component world the widget pipeline runs on.
//!
//! - [`entity`]: generational entity ids
//! - [`component`]: type-erased component columns
//! - [`archetype`]: entities grouped by component set
//! - [`world`]: entities, components, resources
//! - [`query`]: closure queries, filters, subscriptions
//! - [`hierarchy`]: non-owning scene graph and transform propagation
//! - [`system`]: systems and the schedule

pub(crate) mod archetype;
pub(crate) mod component;
pub mod entity;
pub mod hierarchy;
pub mod query;
pub mod system;
pub mod world;

pub use entity::Entity;
pub use hierarchy::{Children, GlobalTransform, SceneGraphNode, propagate_transforms};
pub use query::{Filter, QueryParam, Subscription};
pub use system::{Schedule, System, SystemTiming};
pub use world::{SpawnBundle, World};
