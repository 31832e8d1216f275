//! Plugin wiring: request events and the late per-frame follow tick.
//!
//! Everything runs in `PostUpdate` after transform propagation, so targets
//! have already moved for the frame when the boom picks its position.
use bevy::prelude::*;
use bevy::transform::TransformSystem;

use super::{BoomInstance, BoomOperator, current_instance, destroy, enforce_single_instance, get_or_create};
use crate::settings::BoomSettings;

/// Changes to the boom operator, applied once per frame.
///
/// `Follow`, `FollowWithPriority` and `HoldAt` create the boom entity if it
/// doesn't exist yet. The others do nothing without one.
///
/// Targets are located through their `GlobalTransform`. A target without one
/// (a bare `Transform` included) counts as despawned and is dropped on the
/// next tick.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum BoomRequest {
    /// Make the entity the highest-priority target.
    Follow(Entity),
    FollowWithPriority(Entity, i32),
    Unfollow(Entity),
    ClearTargets,
    /// Freeze at a world position until `Release`.
    HoldAt(Vec3),
    Release,
    Destroy,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoomSet {
    /// Requests are applied and duplicates removed.
    Manage,
    /// The boom entity moves to its target.
    Follow,
}

pub struct BoomOperatorPlugin;

impl Plugin for BoomOperatorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BoomSettings>()
            .init_resource::<BoomInstance>()
            .add_event::<BoomRequest>()
            .configure_sets(
                PostUpdate,
                (BoomSet::Manage, BoomSet::Follow)
                    .chain()
                    .after(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PostUpdate,
                (apply_boom_requests, enforce_single_instance)
                    .chain()
                    .in_set(BoomSet::Manage),
            )
            .add_systems(PostUpdate, follow_targets.in_set(BoomSet::Follow));
    }
}

/// Drain `BoomRequest`s and apply them to the boom entity.
pub fn apply_boom_requests(world: &mut World) {
    let requests: Vec<BoomRequest> = match world.get_resource_mut::<Events<BoomRequest>>() {
        Some(mut events) => events.drain().collect(),
        None => return,
    };

    for request in requests {
        let entity = match request {
            BoomRequest::Destroy => {
                destroy(world);
                continue;
            }
            BoomRequest::Follow(_) | BoomRequest::FollowWithPriority(..) | BoomRequest::HoldAt(_) => {
                get_or_create(world)
            }
            _ => match current_instance(world) {
                Some(entity) => entity,
                None => continue,
            },
        };
        let Some(mut boom) = world.get_mut::<BoomOperator>(entity) else {
            continue;
        };

        match request {
            BoomRequest::Follow(target) => boom.add_target(target),
            BoomRequest::FollowWithPriority(target, priority) => {
                boom.add_target_with_priority(target, priority);
            }
            BoomRequest::Unfollow(target) => {
                boom.remove_target(target);
            }
            BoomRequest::ClearTargets => boom.clear_targets(),
            BoomRequest::HoldAt(position) => boom.hold_at(position),
            BoomRequest::Release => boom.release(),
            BoomRequest::Destroy => {}
        }
    }
}

/// Move the boom entity to its resolved position.
///
/// Runs after propagation, so the boom's `GlobalTransform` is written here as
/// well. The boom entity is expected to be a root.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_targets(
    mut booms: Query<(&mut BoomOperator, &mut Transform, &mut GlobalTransform)>,
    targets: Query<&GlobalTransform, Without<BoomOperator>>,
    settings: Res<BoomSettings>,
) {
    for (mut boom, mut transform, mut global) in &mut booms {
        if settings.sanitize_each_tick {
            let removed = boom.sanitize_targets(&targets);
            if removed > 0 {
                debug!("Dropped {removed} despawned boom targets");
            }
        }

        let position = boom.tick(&targets);
        if transform.translation != position || global.translation() != position {
            transform.translation = position;
            *global = GlobalTransform::from(*transform);
        }
    }
}
