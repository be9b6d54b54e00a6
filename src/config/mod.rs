//! Configuration for wild bushes and nettle spawning.
//!
//! Values are read once at startup from a RON file. Anything malformed is
//! rejected here so the per-tick code can trust every field.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shared::*;

/// Default location of the shipped config, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/config/hedgerow.ron";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgerowConfig {
    /// Master switch. When off, the daily pass clears nettles instead.
    pub nettles_enabled: bool,
    /// Locations the spawn and clear passes walk, by name.
    pub nettle_locations: Vec<String>,
    /// Chance (0..=1) that a location gets any nettles on an eligible day.
    pub nettle_daily_chance_per_location: f64,
    /// Target nettle count is rolled from `[min, max)`.
    pub nettles_added_range: (i32, i32),
    /// Tools that can cut down either bush variety.
    pub nettle_harvesting_tools: Vec<ToolKind>,
    /// How long a nettle sting lasts, in game minutes.
    pub nettle_buff_minutes: u32,
}

impl Default for HedgerowConfig {
    fn default() -> Self {
        Self {
            nettles_enabled: true,
            nettle_locations: vec![
                "Forest".to_string(),
                "Mountain".to_string(),
                "Woods".to_string(),
            ],
            nettle_daily_chance_per_location: 0.35,
            nettles_added_range: (2, 6),
            nettle_harvesting_tools: vec![ToolKind::Scythe, ToolKind::Sword, ToolKind::Axe],
            nettle_buff_minutes: 10,
        }
    }
}

impl HedgerowConfig {
    /// Parse and validate a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, String> {
        let config: HedgerowConfig =
            ron::from_str(source).map_err(|e| format!("Config parse failed: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let (min, max) = self.nettles_added_range;
        if min < 0 || max < min {
            return Err(format!(
                "nettles_added_range must satisfy 0 <= min <= max, got ({}, {})",
                min, max
            ));
        }
        if !(0.0..=1.0).contains(&self.nettle_daily_chance_per_location) {
            return Err(format!(
                "nettle_daily_chance_per_location must be within 0..=1, got {}",
                self.nettle_daily_chance_per_location
            ));
        }
        if self.nettle_harvesting_tools.is_empty() {
            return Err("nettle_harvesting_tools must name at least one tool".to_string());
        }
        Ok(())
    }

    pub fn is_harvesting_tool(&self, tool: ToolKind) -> bool {
        self.nettle_harvesting_tools.contains(&tool)
    }
}

/// Reads the config file. A missing file means "use the defaults"; a file
/// that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<HedgerowConfig, String> {
    if !path.exists() {
        return Ok(HedgerowConfig::default());
    }
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    HedgerowConfig::from_ron_str(&source)
        .map_err(|e| format!("{}: {}", path.display(), e))
}
