//! Boom operator settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! through the watcher in `settings::loader`.
use bevy::prelude::{Resource, Vec3};
use serde::{Deserialize, Serialize};

pub mod loader;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoomSettings {
    #[serde(default = "BoomSettings::default_entity_name")]
    pub entity_name: String, // Name given to the boom entity when it is spawned.
    #[serde(default = "BoomSettings::default_spawn_position")]
    pub spawn_position: (f32, f32, f32), // Where a freshly created boom entity starts.
    #[serde(default = "BoomSettings::default_sanitize_each_tick")]
    pub sanitize_each_tick: bool, // Drop every dead target each frame instead of lazily on query.
    #[serde(default = "BoomSettings::default_report_interval_secs")]
    pub report_interval_secs: f32, // Seconds between state reports in the log, 0 disables them.
}

impl BoomSettings {
    fn default_entity_name() -> String { "BoomOperator".to_string() }
    fn default_spawn_position() -> (f32, f32, f32) { (0.0, 0.0, 0.0) }
    fn default_sanitize_each_tick() -> bool { false }
    fn default_report_interval_secs() -> f32 { 0.0 }

    #[must_use]
    pub fn spawn_translation(&self) -> Vec3 {
        let (x, y, z) = self.spawn_position;
        Vec3::new(x, y, z)
    }
}

impl Default for BoomSettings {
    fn default() -> Self {
        Self {
            entity_name: Self::default_entity_name(),
            spawn_position: Self::default_spawn_position(),
            sanitize_each_tick: Self::default_sanitize_each_tick(),
            report_interval_secs: Self::default_report_interval_secs(),
        }
    }
}
