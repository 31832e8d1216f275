//! Follow targets: the liveness capability and the priority registry.
//!
//! A target is a plain `Entity`. Whether it is still alive, and where it is,
//! is answered by a `TargetLookup`, so an entity despawned behind the
//! registry's back shows up as a lookup miss instead of a dangling access.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use bevy::prelude::{Entity, Vec3};
//! use boom_operator::target::TargetRegistry;
//!
//! let a = Entity::from_raw(1);
//! let b = Entity::from_raw(2);
//! let mut world_positions = HashMap::from([(a, Vec3::X), (b, Vec3::Y)]);
//!
//! let mut registry = TargetRegistry::default();
//! registry.add(a);
//! registry.add(b);
//! assert_eq!(registry.highest_priority_target(&world_positions), Some(b));
//!
//! world_positions.remove(&b);
//! assert_eq!(registry.highest_priority_position(&world_positions), Some(Vec3::X));
//! assert_eq!(registry.len(), 1);
//! ```
pub mod pool;
pub mod registry;

use bevy::ecs::query::QueryFilter;
use bevy::prelude::{Entity, GlobalTransform, Query, Vec3};
use std::collections::HashMap;

pub use pool::{EntryId, EntryPool, TargetEntry};
pub use registry::TargetRegistry;

/// Answers "is this target still alive, and where is it".
pub trait TargetLookup {
    /// World position of `target`, or `None` once it no longer exists.
    fn position(&self, target: Entity) -> Option<Vec3>;

    fn is_alive(&self, target: Entity) -> bool {
        self.position(target).is_some()
    }
}

/// Entities without a `GlobalTransform` are reported as gone.
impl<F: QueryFilter> TargetLookup for Query<'_, '_, &GlobalTransform, F> {
    fn position(&self, target: Entity) -> Option<Vec3> {
        self.get(target).ok().map(GlobalTransform::translation)
    }
}

impl TargetLookup for HashMap<Entity, Vec3> {
    fn position(&self, target: Entity) -> Option<Vec3> {
        self.get(&target).copied()
    }
}
