//! Persisted user preferences and per-scale progress.
//!
//! Both records live as JSON files under a data directory. Loading never fails:
//! an absent file silently yields defaults, an unreadable or corrupt one is
//! logged and also yields defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::notation::NoteNotation;

const SETTINGS_FILE: &str = "settings.json";
const PROGRESS_FILE: &str = "progress.json";

pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
  #[serde(default = "default_sound_enabled")]
  pub sound_enabled: bool,
  #[serde(default = "default_volume")]
  pub volume: f32,
  #[serde(default)]
  pub note_notation: NoteNotation,
}

fn default_sound_enabled() -> bool {
  true
}

fn default_volume() -> f32 {
  DEFAULT_VOLUME
}

impl Default for Settings {
  fn default() -> Self {
    Self { sound_enabled: true, volume: DEFAULT_VOLUME, note_notation: NoteNotation::Standard }
  }
}

impl Settings {
  /// Volume forced into [0, 1]; NaN falls back to the default.
  pub fn clamped(mut self) -> Self {
    self.volume = clamp_volume(self.volume);
    self
  }

  pub fn toggled_sound(mut self) -> Self {
    self.sound_enabled = !self.sound_enabled;
    self
  }

  pub fn with_volume(mut self, volume: f32) -> Self {
    self.volume = clamp_volume(volume);
    self
  }

  pub fn with_notation(mut self, notation: NoteNotation) -> Self {
    self.note_notation = notation;
    self
  }
}

fn clamp_volume(v: f32) -> f32 {
  if v.is_nan() { DEFAULT_VOLUME } else { v.clamp(0.0, 1.0) }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleProgress {
  pub last_played_level: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
  #[serde(default)]
  pub scales: BTreeMap<String, ScaleProgress>,
}

/// File-backed store for `Settings` and `UserProgress`.
#[derive(Clone, Debug)]
pub struct SettingsStore {
  dir: PathBuf,
}

impl SettingsStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// DATA_DIR or `./data`.
  pub fn from_env() -> Self {
    Self::new(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()))
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  #[instrument(level = "debug", skip(self))]
  pub fn load_settings(&self) -> Settings {
    load_or_default::<Settings>(&self.dir.join(SETTINGS_FILE)).clamped()
  }

  #[instrument(level = "debug", skip(self))]
  pub fn save_settings(&self, settings: &Settings) -> Result<(), String> {
    save_json(&self.dir, SETTINGS_FILE, settings)
  }

  pub fn load_progress(&self) -> UserProgress {
    load_or_default::<UserProgress>(&self.dir.join(PROGRESS_FILE))
  }

  pub fn save_progress(&self, progress: &UserProgress) -> Result<(), String> {
    save_json(&self.dir, PROGRESS_FILE, progress)
  }

  #[instrument(level = "debug", skip(self))]
  pub fn record_level_played(&self, scale_id: &str, level: u32) -> Result<(), String> {
    let mut p = self.load_progress();
    p.scales.insert(scale_id.to_string(), ScaleProgress { last_played_level: level });
    self.save_progress(&p)
  }

  /// Remove both records; missing files are fine. Later loads return defaults.
  pub fn clear(&self) -> Result<(), String> {
    for name in [SETTINGS_FILE, PROGRESS_FILE] {
      let path = self.dir.join(name);
      match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(format!("Failed to remove {}: {}", path.display(), e)),
      }
    }
    Ok(())
  }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
  let raw = match std::fs::read_to_string(path) {
    Ok(s) => s,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      debug!(target: "settings", path = %path.display(), "No stored record; using defaults");
      return T::default();
    }
    Err(e) => {
      error!(target: "settings", path = %path.display(), error = %e, "Failed to read stored record; using defaults");
      return T::default();
    }
  };
  match serde_json::from_str::<T>(&raw) {
    Ok(v) => v,
    Err(e) => {
      error!(target: "settings", path = %path.display(), error = %e, "Failed to parse stored record; using defaults");
      T::default()
    }
  }
}

fn save_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), String> {
  std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
  let body = serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize {}: {}", name, e))?;
  let path = dir.join(name);
  std::fs::write(&path, body).map_err(|e| {
    error!(target: "settings", path = %path.display(), error = %e, "Failed to save record");
    format!("Failed to write {}: {}", path.display(), e)
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn temp_store() -> SettingsStore {
    SettingsStore::new(std::env::temp_dir().join(format!("tonedoku-test-{}", Uuid::new_v4())))
  }

  #[test]
  fn missing_files_yield_defaults() {
    let store = temp_store();
    assert_eq!(store.load_settings(), Settings::default());
    assert_eq!(store.load_progress(), UserProgress::default());
  }

  #[test]
  fn corrupt_settings_fall_back_to_defaults() {
    let store = temp_store();
    std::fs::create_dir_all(store.dir()).expect("dir");
    std::fs::write(store.dir().join(SETTINGS_FILE), "{not json").expect("write");
    assert_eq!(store.load_settings(), Settings::default());
    store.clear().expect("clear");
  }

  #[test]
  fn partial_record_keeps_defaults_for_missing_fields() {
    let store = temp_store();
    std::fs::create_dir_all(store.dir()).expect("dir");
    std::fs::write(store.dir().join(SETTINGS_FILE), r#"{"noteNotation":"solfege","volume":4.0}"#).expect("write");
    let s = store.load_settings();
    assert!(s.sound_enabled);
    assert_eq!(s.volume, 1.0);
    assert_eq!(s.note_notation, NoteNotation::Solfege);
    store.clear().expect("clear");
  }

  #[test]
  fn adjusted_settings_persist() {
    let store = temp_store();
    let s = Settings::default().toggled_sound().with_volume(-2.0).with_notation(NoteNotation::Solfege);
    assert!(!s.sound_enabled);
    assert_eq!(s.volume, 0.0);
    store.save_settings(&s).expect("save");

    let reloaded = store.load_settings();
    assert!(!reloaded.sound_enabled);
    assert_eq!(reloaded.volume, 0.0);
    assert_eq!(reloaded.note_notation, NoteNotation::Solfege);
    store.clear().expect("clear");
  }

  #[test]
  fn progress_records_last_played_level() {
    let store = temp_store();
    store.record_level_played("g-major", 2).expect("record");
    store.record_level_played("g-major", 3).expect("record");
    store.record_level_played("f-major", 1).expect("record");

    let p = store.load_progress();
    assert_eq!(p.scales.len(), 2);
    assert_eq!(p.scales["g-major"].last_played_level, 3);
    store.clear().expect("clear");
    assert_eq!(store.load_progress(), UserProgress::default());
  }

  #[test]
  fn settings_use_camel_case_on_the_wire() {
    let json = serde_json::to_value(Settings::default()).expect("json");
    assert_eq!(json["soundEnabled"], true);
    assert_eq!(json["noteNotation"], "standard");
  }
}
