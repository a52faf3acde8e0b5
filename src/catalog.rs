//! Read-only reference data: the scale catalog and the two level catalogs.
//!
//! The built-in tables guarantee the drill is usable without any configuration.
//! A TOML `CatalogConfig` can add scales and tiers; invalid entries are logged
//! and skipped so a bad config never leaves a half-built catalog.

use std::collections::HashSet;

use tracing::{debug, error, info, instrument};

use crate::combinations::choose;
use crate::config::CatalogConfig;
use crate::domain::{LevelConfig, MixedLevelConfig, ScaleCategory, ScaleDefinition};

struct ScaleDef {
  id: &'static str,
  name: &'static str,
  notes: [&'static str; 8],
}

macro_rules! major {
  ($id:expr, $name:expr, [$($n:expr),+ $(,)?]) => {
    ScaleDef { id: $id, name: $name, notes: [$($n),+] }
  };
}

const MAJOR_SCALES: &[ScaleDef] = &[
  major!("c-major", "C Major", ["C", "D", "E", "F", "G", "A", "B", "C"]),
  major!("g-major", "G Major", ["G", "A", "B", "C", "D", "E", "F#", "G"]),
  major!("d-major", "D Major", ["D", "E", "F#", "G", "A", "B", "C#", "D"]),
  major!("a-major", "A Major", ["A", "B", "C#", "D", "E", "F#", "G#", "A"]),
  major!("e-major", "E Major", ["E", "F#", "G#", "A", "B", "C#", "D#", "E"]),
  major!("b-major", "B Major", ["B", "C#", "D#", "E", "F#", "G#", "A#", "B"]),
  major!("f-sharp-major", "F# Major", ["F#", "G#", "A#", "B", "C#", "D#", "E#", "F#"]),
  major!("d-flat-major", "Db Major", ["Db", "Eb", "F", "Gb", "Ab", "Bb", "C", "Db"]),
  major!("a-flat-major", "Ab Major", ["Ab", "Bb", "C", "Db", "Eb", "F", "G", "Ab"]),
  major!("e-flat-major", "Eb Major", ["Eb", "F", "G", "Ab", "Bb", "C", "D", "Eb"]),
  major!("b-flat-major", "Bb Major", ["Bb", "C", "D", "Eb", "F", "G", "A", "Bb"]),
  major!("f-major", "F Major", ["F", "G", "A", "Bb", "C", "D", "E", "F"]),
];

const ALL_INNER: &[usize] = &[1, 2, 3, 4, 5, 6];
const EASY_INNER: &[usize] = &[1, 2, 5, 6];

// (level, missing_notes, questions_count, allowed_positions)
const LEVELS: &[(u32, usize, usize, &[usize])] = &[
  (1, 1, 8, EASY_INNER),
  (2, 1, 8, ALL_INNER),
  (3, 2, 8, ALL_INNER),
  (4, 3, 8, ALL_INNER),
  (5, 4, 8, ALL_INNER),
];

// (level, missing_notes, questions_count, scale_count, allowed_positions)
const MIXED_LEVELS: &[(u32, usize, usize, usize, &[usize])] = &[
  (1, 1, 8, 4, EASY_INNER),
  (2, 1, 10, 6, ALL_INNER),
  (3, 2, 10, 8, ALL_INNER),
  (4, 2, 12, 10, ALL_INNER),
  (5, 3, 12, 12, ALL_INNER),
];

#[derive(Clone, Debug, Default)]
pub struct Catalog {
  pub scales: Vec<ScaleDefinition>,
  pub levels: Vec<LevelConfig>,
  pub mixed_levels: Vec<MixedLevelConfig>,
}

impl Catalog {
  /// Built-in scales and tiers only.
  pub fn builtin() -> Self {
    Self::with_config(None)
  }

  /// Config entries first, then built-ins that don't collide with them.
  #[instrument(level = "info", skip_all, fields(has_config = cfg.is_some()))]
  pub fn with_config(cfg: Option<&CatalogConfig>) -> Self {
    let mut catalog = Catalog::default();

    if let Some(cfg) = cfg {
      for sc in &cfg.scales {
        match ScaleDefinition::from_spelled(&sc.id, &sc.name, sc.category, &sc.notes) {
          Ok(s) => catalog.push_scale(s),
          Err(e) => error!(target: "catalog", id = %sc.id, error = %e, "Skipping config scale"),
        }
      }
      for lc in &cfg.levels {
        catalog.push_level(LevelConfig {
          level: lc.level,
          missing_notes: lc.missing_notes,
          questions_count: lc.questions_count,
          allowed_positions: lc.allowed_positions.clone(),
        });
      }
      for mc in &cfg.mixed_levels {
        catalog.push_mixed_level(MixedLevelConfig {
          base: LevelConfig {
            level: mc.level,
            missing_notes: mc.missing_notes,
            questions_count: mc.questions_count,
            allowed_positions: mc.allowed_positions.clone(),
          },
          scale_count: mc.scale_count,
        });
      }
    }

    for def in MAJOR_SCALES {
      match ScaleDefinition::from_spelled(def.id, def.name, ScaleCategory::Major, &def.notes) {
        Ok(s) => catalog.push_scale(s),
        Err(e) => error!(target: "catalog", id = def.id, error = %e, "Skipping built-in scale"),
      }
    }
    for &(level, missing_notes, questions_count, positions) in LEVELS {
      catalog.push_level(LevelConfig { level, missing_notes, questions_count, allowed_positions: positions.to_vec() });
    }
    for &(level, missing_notes, questions_count, scale_count, positions) in MIXED_LEVELS {
      catalog.push_mixed_level(MixedLevelConfig {
        base: LevelConfig { level, missing_notes, questions_count, allowed_positions: positions.to_vec() },
        scale_count,
      });
    }

    catalog.levels.sort_by_key(|l| l.level);
    catalog.mixed_levels.sort_by_key(|l| l.base.level);

    info!(
      target: "catalog",
      scales = catalog.scales.len(),
      levels = catalog.levels.len(),
      mixed_levels = catalog.mixed_levels.len(),
      "Catalog inventory"
    );
    catalog
  }

  fn push_scale(&mut self, scale: ScaleDefinition) {
    if self.find_scale(&scale.id).is_none() {
      self.scales.push(scale);
    }
  }

  fn push_level(&mut self, level: LevelConfig) {
    if let Err(e) = level.validate() {
      error!(target: "catalog", level = level.level, error = %e, "Skipping invalid level");
      return;
    }
    if self.find_level(level.level).is_none() {
      debug!(
        target: "catalog",
        level = level.level,
        combinations = choose(level.allowed_positions.len(), level.missing_notes),
        questions = level.questions_count,
        "Level registered"
      );
      self.levels.push(level);
    }
  }

  fn push_mixed_level(&mut self, level: MixedLevelConfig) {
    if let Err(e) = level.validate() {
      error!(target: "catalog", level = level.base.level, error = %e, "Skipping invalid mixed level");
      return;
    }
    if self.find_mixed_level(level.base.level).is_none() {
      debug!(
        target: "catalog",
        level = level.base.level,
        combinations = choose(level.base.allowed_positions.len(), level.base.missing_notes),
        questions = level.base.questions_count,
        scale_count = level.scale_count,
        "Mixed level registered"
      );
      self.mixed_levels.push(level);
    }
  }

  pub fn find_scale(&self, id: &str) -> Option<&ScaleDefinition> {
    self.scales.iter().find(|s| s.id == id)
  }

  pub fn find_level(&self, level: u32) -> Option<&LevelConfig> {
    self.levels.iter().find(|l| l.level == level)
  }

  pub fn find_mixed_level(&self, level: u32) -> Option<&MixedLevelConfig> {
    self.mixed_levels.iter().find(|l| l.base.level == level)
  }

  pub fn has_next_level(&self, level: u32) -> bool {
    level.checked_add(1).is_some_and(|next| self.find_level(next).is_some())
  }

  pub fn has_next_mixed_level(&self, level: u32) -> bool {
    level.checked_add(1).is_some_and(|next| self.find_mixed_level(next).is_some())
  }

  /// Distinct categories present, in first-seen order.
  pub fn categories(&self) -> Vec<ScaleCategory> {
    let mut seen = HashSet::new();
    self.scales.iter().map(|s| s.category).filter(|c| seen.insert(*c)).collect()
  }
}
