//! Creation, teardown and uniqueness of the boom entity.
//!
//! Exactly one `BoomOperator` is meant to exist. `BoomInstance` records which
//! entity that is. The component's `on_add` hook records the first operator
//! added while none is live, so the older one always wins; `get_or_create`
//! fills the record lazily, `destroy` clears it and `enforce_single_instance`
//! tears down any extra `BoomOperator` that shows up.
//!
//! Teardown either despawns the whole entity or only strips the boom
//! components. The entity is despawned only when it carries nothing beyond the
//! components `get_or_create` put there and has no children, so content the
//! host attached to the same entity survives.
use bevy::ecs::component::ComponentId;
use bevy::ecs::world::DeferredWorld;
use bevy::log::{info, warn};
use bevy::prelude::*;
use std::any::TypeId;

use super::{BoomOperator, Persistent};
use crate::settings::BoomSettings;

/// The entity currently acting as the boom operator, if any.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BoomInstance(pub Option<Entity>);

/// What a teardown did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The entity held only the boom's own components and was despawned.
    DespawnEntity,
    /// The entity had other components or children; only the boom components
    /// were removed.
    DetachComponent,
}

impl Teardown {
    /// Decide the teardown for an entity with `extra_components` components
    /// outside the boom's own set and `children` child entities.
    #[must_use]
    pub fn plan(extra_components: usize, children: usize) -> Self {
        if extra_components == 0 && children == 0 {
            Teardown::DespawnEntity
        } else {
            Teardown::DetachComponent
        }
    }
}

/// Components `get_or_create` spawns the boom entity with.
fn core_components() -> [TypeId; 5] {
    [
        TypeId::of::<Transform>(),
        TypeId::of::<GlobalTransform>(),
        TypeId::of::<Name>(),
        TypeId::of::<Persistent>(),
        TypeId::of::<BoomOperator>(),
    ]
}

/// The recorded instance, if it still carries a `BoomOperator`.
#[must_use]
pub fn current_instance(world: &World) -> Option<Entity> {
    world
        .get_resource::<BoomInstance>()
        .and_then(|instance| instance.0)
        .filter(|&entity| world.get::<BoomOperator>(entity).is_some())
}

/// `on_add` hook of `BoomOperator`.
///
/// Needs a `BoomInstance` resource to act. With no live instance recorded the
/// new entity becomes the instance; otherwise the duplicate check is queued
/// and runs at the next command flush.
pub fn record_instance(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    let Some(recorded) = world.get_resource::<BoomInstance>().map(|instance| instance.0) else {
        return;
    };
    match recorded {
        Some(other) if other != entity && world.get::<BoomOperator>(other).is_some() => {
            world.commands().add(enforce_single_instance);
        }
        _ => {
            world.resource_mut::<BoomInstance>().0 = Some(entity);
            world.commands().add(move |world: &mut World| adopt(world, entity));
        }
    }
}

/// Give an operator entity the components the tick needs, keeping any it
/// already has. Transforms start at the operator's own position.
fn adopt(world: &mut World, entity: Entity) {
    let Some(position) = world.get::<BoomOperator>(entity).map(BoomOperator::position) else {
        return;
    };
    let mut operator = world.entity_mut(entity);
    if !operator.contains::<Transform>() {
        operator.insert(Transform::from_translation(position));
    }
    if !operator.contains::<GlobalTransform>() {
        operator.insert(GlobalTransform::from_translation(position));
    }
    if !operator.contains::<Persistent>() {
        operator.insert(Persistent);
    }
}

/// Return the boom entity, spawning it if there is none.
///
/// An unrecorded entity that already carries `BoomOperator` is adopted rather
/// than spawning a second one, and gets any missing transform. New entities
/// start at `BoomSettings::spawn_position` in `Following` mode.
pub fn get_or_create(world: &mut World) -> Entity {
    if let Some(entity) = current_instance(world) {
        adopt(world, entity);
        return entity;
    }

    let existing = world
        .query_filtered::<Entity, With<BoomOperator>>()
        .iter(world)
        .next();
    let entity = match existing {
        Some(entity) => {
            adopt(world, entity);
            debug!("Adopted existing boom operator {}", describe(world, entity));
            entity
        }
        None => {
            let settings = world.get_resource::<BoomSettings>().cloned().unwrap_or_default();
            let spawn = settings.spawn_translation();
            let entity = world
                .spawn((
                    Transform::from_translation(spawn),
                    GlobalTransform::from_translation(spawn),
                    Name::new(settings.entity_name),
                    Persistent,
                    BoomOperator::new(spawn),
                ))
                .id();
            debug!("Spawned boom operator {entity:?} at {spawn}");
            entity
        }
    };

    world.insert_resource(BoomInstance(Some(entity)));
    entity
}

/// Tear down the boom entity. Returns `None` when there was none.
pub fn destroy(world: &mut World) -> Option<Teardown> {
    let entity = current_instance(world)?;
    let outcome = teardown(world, entity);
    world.insert_resource(BoomInstance(None));
    Some(outcome)
}

/// Keep a single `BoomOperator` alive.
///
/// The recorded instance wins. Without one (no `BoomInstance` resource when
/// the operators were added) the first found is adopted. Every other
/// `BoomOperator` entity is torn down with a warning naming it.
pub fn enforce_single_instance(world: &mut World) {
    let found: Vec<Entity> = world
        .query_filtered::<Entity, With<BoomOperator>>()
        .iter(world)
        .collect();
    if found.is_empty() {
        return;
    }

    let keep = match current_instance(world) {
        Some(entity) => entity,
        None => get_or_create(world),
    };

    for duplicate in found.into_iter().filter(|&e| e != keep) {
        warn!(
            "Boom operator {} already exists; tearing down duplicate {}",
            describe(world, keep),
            describe(world, duplicate)
        );
        teardown(world, duplicate);
    }
}

/// Apply the teardown rule to `entity`, which must carry `BoomOperator`.
pub fn teardown(world: &mut World, entity: Entity) -> Teardown {
    let core = core_components();
    let extra_components = world
        .inspect_entity(entity)
        .into_iter()
        .filter(|info| {
            info.type_id().is_some_and(|id| {
                id != TypeId::of::<Children>() && !core.contains(&id)
            })
        })
        .count();
    let children = world.get::<Children>(entity).map_or(0, |c| c.len());
    let label = describe(world, entity);

    let plan = Teardown::plan(extra_components, children);
    match plan {
        Teardown::DespawnEntity => {
            world.despawn(entity);
            info!("Destroyed boom operator entity {label}");
        }
        Teardown::DetachComponent => {
            world.entity_mut(entity).remove::<(BoomOperator, Persistent)>();
            warn!(
                "Boom operator {label} shares its entity ({extra_components} other components, \
                 {children} children); removed the boom components only"
            );
        }
    }
    plan
}

fn describe(world: &World, entity: Entity) -> String {
    match world.get::<Name>(entity) {
        Some(name) => format!("'{}' ({entity:?})", name.as_str()),
        None => format!("{entity:?}"),
    }
}
