//! The boom operator: a single entity (camera rig, audio listener) that sits on
//! the highest-priority live follow target each frame, or holds still at a
//! fixed point on request.
//!
//! The module provides the `BoomOperator` component, its lifecycle helpers and
//! the plugin that drives it.
//!
//! # Example:
//!
//! ```ignore
//! app.add_plugins(BoomOperatorPlugin);
//!
//! fn follow_player(player: Query<Entity, Added<Player>>, mut requests: EventWriter<BoomRequest>) {
//!     for entity in &player {
//!         requests.send(BoomRequest::Follow(entity));
//!     }
//! }
//! ```
pub mod controller;
pub mod lifecycle;
pub mod plugin;

use bevy::ecs::component::{ComponentHooks, StorageType};
use bevy::prelude::*;

use crate::target::{TargetLookup, TargetRegistry};

pub use controller::*;
pub use lifecycle::*;
pub use plugin::*;

/// Marks an entity that outlives scene changes. Host code that tears down a
/// scene should skip entities carrying it.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Persistent;

/// Follow state of the boom entity: its targets, its mode and the position it
/// currently wants to be at.
///
/// Adding this component records its entity as the boom instance when none is
/// live, or schedules the duplicate check when one already is (see
/// `lifecycle::record_instance`).
#[derive(Debug, Clone)]
pub struct BoomOperator {
    targets: TargetRegistry,
    controller: FollowController,
    position: Vec3,
}

impl Component for BoomOperator {
    const STORAGE_TYPE: StorageType = StorageType::Table;

    fn register_component_hooks(hooks: &mut ComponentHooks) {
        hooks.on_add(record_instance);
    }
}

impl BoomOperator {
    /// A new operator in `Following` mode, parked at `spawn_position`.
    #[must_use]
    pub fn new(spawn_position: Vec3) -> Self {
        Self {
            targets: TargetRegistry::new(),
            controller: FollowController::default(),
            position: spawn_position,
        }
    }

    /// Position applied to the transform on the last tick (or set by `hold_at`).
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn mode(&self) -> FollowMode {
        self.controller.mode()
    }

    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.controller.is_holding()
    }

    #[must_use]
    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// Make `target` the one followed from now on.
    pub fn add_target(&mut self, target: Entity) {
        self.targets.add(target);
    }

    pub fn add_target_with_priority(&mut self, target: Entity, priority: i32) {
        self.targets.add_with_priority(target, priority);
    }

    pub fn remove_target(&mut self, target: Entity) -> bool {
        self.targets.remove(target)
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn sanitize_targets(&mut self, lookup: &impl TargetLookup) -> usize {
        self.targets.sanitize(lookup)
    }

    pub fn highest_priority_target(&mut self, lookup: &impl TargetLookup) -> Option<Entity> {
        self.targets.highest_priority_target(lookup)
    }

    /// Freeze at `position`, moving there immediately.
    pub fn hold_at(&mut self, position: Vec3) {
        self.position = self.controller.hold_at(position);
    }

    /// Resume following on the next tick, from wherever the entity is now.
    pub fn release(&mut self) {
        self.controller.release();
    }

    /// Advance one frame and return the position to apply.
    pub fn tick(&mut self, lookup: &impl TargetLookup) -> Vec3 {
        self.position = self
            .controller
            .resolve(&mut self.targets, lookup, self.position);
        self.position
    }
}
