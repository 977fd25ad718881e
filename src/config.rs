//! Startup configuration.
//!
//! Everything has a default; `dashboard.json` in the working directory may
//! override any subset of the fields.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Serialized classifier loaded once at startup.
    pub model_path: PathBuf,
    /// Rows shown in the raw upload preview.
    pub preview_rows: usize,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("random_forest_model.json"),
            preview_rows: 5,
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

impl DashboardConfig {
    /// Read `dashboard.json` from the working directory, or fall back to
    /// defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
