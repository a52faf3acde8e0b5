//! Loading an optional catalog extension (extra scales and level tiers) from TOML.
//!
//! See `CatalogConfig` for the expected schema. Entries here take precedence over
//! built-ins with the same scale id or level number.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::ScaleCategory;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CatalogConfig {
  #[serde(default)]
  pub scales: Vec<ScaleCfg>,
  #[serde(default)]
  pub levels: Vec<LevelCfg>,
  #[serde(default)]
  pub mixed_levels: Vec<MixedLevelCfg>,
}

/// Scale entry accepted in TOML. Notes are spelled (`"F#"`, `"Bb"`) and must be
/// eight long, root through octave.
#[derive(Clone, Debug, Deserialize)]
pub struct ScaleCfg {
  pub id: String,
  pub name: String,
  #[serde(default)] pub category: ScaleCategory,
  pub notes: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LevelCfg {
  pub level: u32,
  pub missing_notes: usize,
  pub questions_count: usize,
  #[serde(default = "default_positions")] pub allowed_positions: Vec<usize>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MixedLevelCfg {
  pub level: u32,
  pub missing_notes: usize,
  pub questions_count: usize,
  pub scale_count: usize,
  #[serde(default = "default_positions")] pub allowed_positions: Vec<usize>,
}

/// Every position except root and octave.
fn default_positions() -> Vec<usize> {
  vec![1, 2, 3, 4, 5, 6]
}

pub fn parse_catalog_config(s: &str) -> Result<CatalogConfig, String> {
  toml::from_str::<CatalogConfig>(s).map_err(|e| e.to_string())
}

/// Attempt to load `CatalogConfig` from CATALOG_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_catalog_config_from_env() -> Option<CatalogConfig> {
  let path = std::env::var("CATALOG_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_catalog_config(&s) {
      Ok(cfg) => {
        info!(target: "tonedoku_backend", %path, scales = cfg.scales.len(), levels = cfg.levels.len(), mixed_levels = cfg.mixed_levels.len(), "Loaded catalog config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "tonedoku_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "tonedoku_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
