use bevy::app::ScheduleRunnerPlugin;
use bevy::hierarchy::HierarchyPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use std::time::Duration;

use boom_operator::boom::current_instance;
use boom_operator::debug::report_boom_state;
use boom_operator::settings::loader as settings_loader;
use boom_operator::{BoomOperator, BoomOperatorPlugin, BoomRequest};

const SETTINGS_DIR: &str = "data/settings";
// Frames per second of the headless loop.
const TICK_RATE: f64 = 60.0;
const RUN_FRAMES: u32 = 300;

/// Walks in a circle around `center`.
#[derive(Component)]
struct Actor {
    center: Vec3,
    radius: f32,
    speed: f32,
}

#[derive(Resource, Default)]
struct Cast {
    hero: Option<Entity>,
    sidekick: Option<Entity>,
}

fn spawn_actors(mut commands: Commands, mut cast: ResMut<Cast>) {
    let hero = commands
        .spawn((
            Name::new("hero"),
            TransformBundle::from_transform(Transform::from_xyz(0.0, 0.0, 0.0)),
            Actor { center: Vec3::ZERO, radius: 2.0, speed: 1.0 },
        ))
        .id();
    let sidekick = commands
        .spawn((
            Name::new("sidekick"),
            TransformBundle::from_transform(Transform::from_xyz(5.0, 0.0, 0.0)),
            Actor { center: Vec3::new(5.0, 0.0, 0.0), radius: 1.0, speed: 2.5 },
        ))
        .id();
    cast.hero = Some(hero);
    cast.sidekick = Some(sidekick);
}

fn move_actors(mut actors: Query<(&Actor, &mut Transform)>, time: Res<Time>) {
    let t = time.elapsed_seconds();
    for (actor, mut transform) in &mut actors {
        let angle = t * actor.speed;
        transform.translation = actor.center + Vec3::new(angle.cos(), 0.0, angle.sin()) * actor.radius;
    }
}

/// Scripted timeline exercising follow, fallback, hold and teardown.
fn direct_scene(
    mut commands: Commands,
    mut cast: ResMut<Cast>,
    mut requests: EventWriter<BoomRequest>,
    mut exit: EventWriter<AppExit>,
    mut frame: Local<u32>,
) {
    *frame += 1;
    match *frame {
        2 => {
            if let Some(hero) = cast.hero {
                requests.send(BoomRequest::Follow(hero));
            }
        }
        3 => {
            if let Some(sidekick) = cast.sidekick {
                requests.send(BoomRequest::Follow(sidekick));
            }
        }
        90 => {
            if let Some(sidekick) = cast.sidekick.take() {
                info!("sidekick leaves the scene");
                commands.entity(sidekick).despawn_recursive();
            }
        }
        150 => {
            requests.send(BoomRequest::HoldAt(Vec3::new(10.0, 0.0, 0.0)));
        }
        210 => {
            requests.send(BoomRequest::Release);
        }
        270 => {
            requests.send(BoomRequest::Destroy);
        }
        f if f >= RUN_FRAMES => {
            exit.send(AppExit::Success);
        }
        _ => {}
    }
}

fn log_boom_position(world: &mut World) {
    let Some(entity) = current_instance(world) else { return };
    let frame = world.resource::<bevy::core::FrameCount>().0;
    if frame % 30 != 0 {
        return;
    }
    if let Some(boom) = world.get::<BoomOperator>(entity) {
        info!("frame {frame}: boom at {} ({:?})", boom.position(), boom.mode());
    }
}

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub(SETTINGS_DIR));

    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / TICK_RATE))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins((TransformPlugin, HierarchyPlugin))
    .add_plugins(BoomOperatorPlugin);

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.init_resource::<Cast>();

    app.add_systems(Startup, spawn_actors);
    app.add_systems(Update, move_actors);
    app.add_systems(Update, direct_scene);
    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Last, log_boom_position);
    app.add_systems(Last, report_boom_state);

    app.run();
}
