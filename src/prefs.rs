//! User preferences: update-check switch, ignore list, watch list.
//!
//! Stored as pretty JSON under the platform config directory and written
//! atomically (temp file + rename) so a crash mid-save never leaves a
//! half-written file behind.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::ui;
use crate::utils::paths;

/// On-disk preferences document. `last_check_time` is milliseconds since
/// the epoch, 0 meaning never checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefsData {
    pub check_updates: bool,
    pub ignored_packages: Vec<String>,
    pub watched_packages: Vec<String>,
    pub last_check_time: i64,
}

impl Default for PrefsData {
    fn default() -> Self {
        PrefsData {
            check_updates: true,
            ignored_packages: Vec::new(),
            watched_packages: Vec::new(),
            last_check_time: 0,
        }
    }
}

/// Read and mutate user preferences. Mutations persist immediately.
pub trait Preferences: Send + Sync {
    fn should_check_updates(&self) -> bool;
    fn is_ignored(&self, name: &str) -> bool;
    fn is_watched(&self, name: &str) -> bool;
    fn watched_packages(&self) -> Vec<String>;
    fn last_check_time(&self) -> Option<DateTime<Utc>>;

    fn set_check_updates(&self, enabled: bool) -> Result<()>;
    /// Flips membership on the ignore list; returns the new state.
    fn toggle_ignored(&self, name: &str) -> Result<bool>;
    /// Flips membership on the watch list; returns the new state.
    fn toggle_watched(&self, name: &str) -> Result<bool>;
    fn set_last_check_time(&self, when: DateTime<Utc>) -> Result<()>;
}

/// File-backed [`Preferences`] implementation.
pub struct FilePreferences {
    path: PathBuf,
    data: Mutex<PrefsData>,
}

impl FilePreferences {
    /// Loads from the default location under the platform config directory.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(paths::prefs_file()?))
    }

    /// Loads from an explicit path. A missing file yields defaults; a
    /// corrupt one is reported and replaced by defaults on the next save.
    pub fn load_from(path: PathBuf) -> Self {
        let data = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(data) => data,
                    Err(e) => {
                        ui::warning(&format!("Preferences file corrupted, using defaults: {e}"));
                        PrefsData::default()
                    }
                },
                Err(e) => {
                    ui::warning(&format!("Failed to read preferences, using defaults: {e}"));
                    PrefsData::default()
                }
            }
        } else {
            PrefsData::default()
        };
        FilePreferences {
            path,
            data: Mutex::new(data),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PrefsData>> {
        self.data
            .lock()
            .map_err(|_| SweepError::LockError("preferences store".to_string()))
    }

    fn persist(&self, data: &PrefsData) -> Result<()> {
        let Some(dir) = self.path.parent() else {
            return Err(SweepError::ConfigError(format!(
                "Preferences path has no parent directory: {}",
                self.path.display()
            )));
        };
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("tmp");
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Preferences for FilePreferences {
    fn should_check_updates(&self) -> bool {
        self.data.lock().map(|d| d.check_updates).unwrap_or(true)
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.data
            .lock()
            .map(|d| d.ignored_packages.iter().any(|n| n == name))
            .unwrap_or(false)
    }

    fn is_watched(&self, name: &str) -> bool {
        self.data
            .lock()
            .map(|d| d.watched_packages.iter().any(|n| n == name))
            .unwrap_or(false)
    }

    fn watched_packages(&self) -> Vec<String> {
        self.data
            .lock()
            .map(|d| d.watched_packages.clone())
            .unwrap_or_default()
    }

    fn last_check_time(&self) -> Option<DateTime<Utc>> {
        let millis = self.data.lock().map(|d| d.last_check_time).unwrap_or(0);
        if millis == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(millis)
    }

    fn set_check_updates(&self, enabled: bool) -> Result<()> {
        let mut data = self.lock()?;
        data.check_updates = enabled;
        self.persist(&data)
    }

    fn toggle_ignored(&self, name: &str) -> Result<bool> {
        let mut data = self.lock()?;
        let now_present = toggle(&mut data.ignored_packages, name);
        self.persist(&data)?;
        Ok(now_present)
    }

    fn toggle_watched(&self, name: &str) -> Result<bool> {
        let mut data = self.lock()?;
        let now_present = toggle(&mut data.watched_packages, name);
        self.persist(&data)?;
        Ok(now_present)
    }

    fn set_last_check_time(&self, when: DateTime<Utc>) -> Result<()> {
        let mut data = self.lock()?;
        data.last_check_time = when.timestamp_millis();
        self.persist(&data)
    }
}

fn toggle(list: &mut Vec<String>, name: &str) -> bool {
    if let Some(pos) = list.iter().position(|n| n == name) {
        list.remove(pos);
        false
    } else {
        list.push(name.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn prefs_in(dir: &TempDir) -> FilePreferences {
        FilePreferences::load_from(dir.path().join("preferences.json"))
    }

    #[test]
    fn defaults_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let prefs = prefs_in(&dir);
        assert!(prefs.should_check_updates());
        assert!(prefs.watched_packages().is_empty());
        assert!(!prefs.is_ignored("anything"));
        assert!(prefs.last_check_time().is_none());
    }

    #[test]
    fn toggles_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let prefs = prefs_in(&dir);
        assert!(prefs.toggle_watched("typescript").unwrap());
        assert!(prefs.toggle_ignored("wget").unwrap());

        let reloaded = prefs_in(&dir);
        assert!(reloaded.is_watched("typescript"));
        assert!(reloaded.is_ignored("wget"));
        assert!(!reloaded.is_watched("wget"));
    }

    #[test]
    fn toggling_twice_removes() {
        let dir = TempDir::new().unwrap();
        let prefs = prefs_in(&dir);
        assert!(prefs.toggle_watched("eslint").unwrap());
        assert!(!prefs.toggle_watched("eslint").unwrap());
        assert!(!prefs.is_watched("eslint"));
        assert!(prefs_in(&dir).watched_packages().is_empty());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let prefs = FilePreferences::load_from(path.clone());
        assert!(prefs.should_check_updates());

        // Next save replaces the corrupt file with valid JSON.
        prefs.set_check_updates(false).unwrap();
        let reloaded = FilePreferences::load_from(path);
        assert!(!reloaded.should_check_updates());
    }

    #[test]
    fn last_check_time_round_trips() {
        let dir = TempDir::new().unwrap();
        let prefs = prefs_in(&dir);
        let stamp = Utc::now();
        prefs.set_last_check_time(stamp).unwrap();

        let loaded = prefs_in(&dir).last_check_time().unwrap();
        assert_eq!(loaded.timestamp_millis(), stamp.timestamp_millis());
    }

    #[test]
    fn unknown_fields_do_not_break_loading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(
            &path,
            r#"{"check_updates": false, "watched_packages": ["node"], "theme": "dark"}"#,
        )
        .unwrap();
        let prefs = FilePreferences::load_from(path);
        assert!(!prefs.should_check_updates());
        assert!(prefs.is_watched("node"));
    }
}
