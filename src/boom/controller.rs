//! Follow/hold state machine.
//!
//! `Following` tracks the registry's highest live target every tick and keeps
//! the last known position when there is none. `Holding` pins the position
//! until `release`; releasing does not move anything by itself.
use bevy::prelude::Vec3;

use crate::target::{TargetLookup, TargetRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FollowMode {
    #[default]
    Following,
    /// Frozen at the given world position.
    Holding(Vec3),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FollowController {
    mode: FollowMode,
}

impl FollowController {
    #[must_use]
    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    #[must_use]
    pub fn is_holding(&self) -> bool {
        matches!(self.mode, FollowMode::Holding(_))
    }

    /// Freeze at `position`. Returns the position the tracked entity should
    /// jump to right away.
    pub fn hold_at(&mut self, position: Vec3) -> Vec3 {
        self.mode = FollowMode::Holding(position);
        position
    }

    pub fn release(&mut self) {
        self.mode = FollowMode::Following;
    }

    /// Position for this tick given the tracked entity's `current` one.
    ///
    /// Only the registry's lazy cleanup mutates anything here; the mode is
    /// never changed by a tick.
    pub fn resolve(
        &self,
        registry: &mut TargetRegistry,
        lookup: &impl TargetLookup,
        current: Vec3,
    ) -> Vec3 {
        match self.mode {
            FollowMode::Holding(frozen) => frozen,
            FollowMode::Following => registry
                .highest_priority_position(lookup)
                .unwrap_or(current),
        }
    }
}
