//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in a directory (`data/settings` in the
//! binary). If multiple RON files are present the first one, by file name, that
//! parses wins. With no parseable file the defaults are used.
use bevy::log::{info, warn};
use bevy::prelude::{Res, ResMut, Resource};

use crate::ron::{RonWatcher, load_ron_files, setup_ron_watcher};
use crate::settings::BoomSettings;

#[derive(Resource)]
pub struct SettingsWatcher {
    watcher: RonWatcher,
    dir: String,
}

impl SettingsWatcher {
    /// A watcher with no OS backing, for when the OS watcher can't be created.
    /// It only fires through `request_reload`.
    #[must_use]
    pub fn stub(dir: &str) -> Self {
        SettingsWatcher { watcher: RonWatcher::stub(), dir: dir.to_string() }
    }

    /// Reload on the next `check_settings_changes` even without a file event.
    pub fn request_reload(&self) {
        self.watcher.mark_changed();
    }
}

/// Load settings from the `.ron` files in `path`.
///
/// # Example
/// ```
/// use boom_operator::settings::{BoomSettings, loader::load_settings_from_dir};
///
/// let settings = load_settings_from_dir("no/such/dir");
/// assert_eq!(settings, BoomSettings::default());
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> BoomSettings {
    let items: Vec<BoomSettings> = load_ron_files(path);
    match items.into_iter().next() {
        Some(first) => first,
        None => {
            warn!("No boom settings found in {path}, using defaults");
            BoomSettings::default()
        }
    }
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns a `notify::Error` if the directory can't be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(|watcher| SettingsWatcher { watcher, dir: path.to_string() })
}

/// Reload the `BoomSettings` resource when the watched directory changes.
///
/// # Example
/// ```ignore
/// app.add_systems(Update, boom_operator::settings::loader::check_settings_changes);
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<BoomSettings>) {
    if watcher.watcher.take_changed() {
        info!("Boom settings changed, reloading...");
        let reloaded = load_settings_from_dir(&watcher.dir);
        if *settings != reloaded {
            *settings = reloaded;
        }
    }
}
