//! TOML-based engine configuration.
//!
//! Stores the tunables of the scheduling engine:
//! - grid geometry and snap behavior for gesture surfaces
//! - working-hours window for slot search
//! - external calendar sync settings
//!
//! Configuration is stored at `~/.config/timegrid/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::conflict::SlotSearchConfig;
use crate::gesture::GridMetrics;
use crate::sync::SyncConfig;

/// Returns `~/.config/timegrid[-dev]/` based on TIMEGRID_ENV.
///
/// Set TIMEGRID_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMEGRID_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timegrid-dev")
    } else {
        base_dir.join("timegrid")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/timegrid/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grid: GridMetrics,
    #[serde(default)]
    pub slots: SlotSearchConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Display duration applied to tasks on save, in minutes.
    #[serde(default = "default_task_display_minutes")]
    pub task_display_minutes: u32,
    /// Horizon for materializing unbounded linked series, in days.
    #[serde(default = "default_series_horizon_days")]
    pub series_horizon_days: u32,
}

fn default_task_display_minutes() -> u32 {
    30
}

fn default_series_horizon_days() -> u32 {
    90
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridMetrics::default(),
            slots: SlotSearchConfig::default(),
            sync: SyncConfig::default(),
            task_display_minutes: default_task_display_minutes(),
            series_horizon_days: default_series_horizon_days(),
        }
    }
}

impl EngineConfig {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: EngineConfig = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load from an explicit path (tests, CLI overrides).
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.grid.pixels_per_hour = 80.0;
        config.slots.work_hours_start = 7;
        config.sync.enabled = true;
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded.grid.pixels_per_hour, 80.0);
        assert_eq!(loaded.slots.work_hours_start, 7);
        assert!(loaded.sync.enabled);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "task_display_minutes = 45\n").unwrap();

        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded.task_display_minutes, 45);
        assert_eq!(loaded.grid.snap_minutes, 15);
        assert_eq!(loaded.slots.work_hours_end, 18);
    }
}
