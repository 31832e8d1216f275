//! Utilities for loading RON files and watching directories for changes.
//!
//! `load_ron_file` reads a single file, `load_ron_files` collects every
//! parseable `.ron` file in a directory, and `RonWatcher` raises a shared flag
//! when something in a watched directory is modified. Together they back the
//! hot-reloadable settings.

use bevy::log::warn;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RonLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// File-watcher handle for RON hot-reload.
pub struct RonWatcher {
    changed: Arc<AtomicBool>, // Set when a watched file is modified.
    _watcher: Option<RecommendedWatcher>, // Kept alive so events keep flowing.
}

impl RonWatcher {
    /// A watcher with no OS backing; it only fires through `mark_changed`.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Raise the change flag by hand, forcing a reload on the next check.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    /// Whether a change was seen since the last call. Clears the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_stub(&self) -> bool {
        self._watcher.is_none()
    }
}

/// Read and deserialize one RON file.
///
/// # Errors
/// Returns `RonLoadError::Io` when the file can't be read and
/// `RonLoadError::Parse` when its contents don't deserialize into `T`.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, RonLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| RonLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| RonLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `.ron` file in `path`, in file name order.
///
/// Files that fail to load are skipped with a warning. A missing directory
/// yields an empty `Vec`.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    files
        .iter()
        .filter_map(|file| match load_ron_file(file) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

/// Watch `path` (non-recursively) for modifications.
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created or the
/// directory cannot be registered.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let flag = changed.clone();
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched_path)
                });
                if relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("Watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_loads_nothing() {
        let items: Vec<u32> = load_ron_files("this/directory/does/not/exist");
        assert!(items.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_ron_file::<u32>(Path::new("nope/missing.ron")).unwrap_err();
        assert!(matches!(err, RonLoadError::Io { .. }));
    }

    #[test]
    fn stub_only_reports_manual_changes() {
        let watcher = RonWatcher::stub();
        assert!(watcher.is_stub());
        assert!(!watcher.take_changed());

        watcher.mark_changed();
        assert!(watcher.take_changed());
        assert!(!watcher.take_changed());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let file = dir.path().join("broken.ron");
        std::fs::write(&file, "(entity_name: ").expect("write broken.ron");

        let err = load_ron_file::<crate::settings::BoomSettings>(&file).unwrap_err();
        assert!(matches!(err, RonLoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn directory_load_skips_unparseable_and_foreign_files() {
        let dir = tempfile::tempdir().expect("create tempdir");
        std::fs::write(dir.path().join("a.ron"), "1").expect("write a.ron");
        std::fs::write(dir.path().join("b.ron"), "not a number").expect("write b.ron");
        std::fs::write(dir.path().join("c.ron"), "3").expect("write c.ron");
        std::fs::write(dir.path().join("d.txt"), "4").expect("write d.txt");

        let items: Vec<u32> = load_ron_files(dir.path().to_str().expect("utf-8 path"));
        assert_eq!(items, vec![1, 3]);
    }
}
