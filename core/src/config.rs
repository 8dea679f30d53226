//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for capture and playback
//! settings. Settings are stored in TOML format in the platform-specific
//! config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReplayError, Result};
use crate::replay::{
    DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_DURATION, DEFAULT_SNAPSHOT_INTERVAL, HeadlessConfig,
    SMOOTH_FACTOR, SchedulerConfig,
};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GhostConfig {
    /// Run capture settings
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Ghost playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Saved run storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Run capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Length of one physics tick in seconds (default: 0.02)
    #[serde(default = "default_fixed_timestep")]
    pub fixed_timestep: f32,
    /// Snapshot every N physics ticks (default: 2, minimum: 1)
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_ticks: u32,
    /// Runs longer than this are discarded, in seconds (default: 60)
    #[serde(default = "default_max_duration")]
    pub max_duration: f32,
}

/// Ghost playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Fraction of the remaining distance covered per frame (default: 0.1)
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f32,
    /// Remove the ghost once its run ends (default: true)
    #[serde(default = "default_true")]
    pub destroy_on_complete: bool,
    /// Frame length used by headless playback (default: 60fps)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

/// Saved run storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory for `.ghost` files (default: platform data dir)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_fixed_timestep() -> f32 {
    DEFAULT_FIXED_TIMESTEP
}
fn default_snapshot_interval() -> u32 {
    DEFAULT_SNAPSHOT_INTERVAL
}
fn default_max_duration() -> f32 {
    DEFAULT_MAX_DURATION
}
fn default_smooth_factor() -> f32 {
    SMOOTH_FACTOR
}
fn default_frame_rate() -> u32 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: default_fixed_timestep(),
            snapshot_interval_ticks: default_snapshot_interval(),
            max_duration: default_max_duration(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            smooth_factor: default_smooth_factor(),
            destroy_on_complete: default_true(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl GhostConfig {
    /// Scheduler settings, with out-of-range values pulled back to something
    /// usable.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let step = self.capture.fixed_timestep;
        let fixed_timestep = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_FIXED_TIMESTEP
        };
        let smooth_factor = if self.playback.smooth_factor.is_finite() {
            self.playback.smooth_factor.clamp(0.0, 1.0)
        } else {
            SMOOTH_FACTOR
        };

        SchedulerConfig {
            fixed_timestep,
            snapshot_interval_ticks: self.capture.snapshot_interval_ticks.max(1),
            max_duration: self.capture.max_duration,
            smooth_factor,
        }
    }

    /// Headless host settings derived from the playback section
    pub fn headless_config(&self) -> HeadlessConfig {
        HeadlessConfig {
            frame_delta: 1.0 / self.playback.frame_rate.max(1) as f32,
            destroy_on_complete: self.playback.destroy_on_complete,
            ..HeadlessConfig::default()
        }
    }

    /// Directory for saved runs: the configured one, else the platform data
    /// directory.
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage
            .directory
            .clone()
            .or_else(|| data_dir().map(|d| d.join("runs")))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io.ghostline", "", "Ghostline")
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Ghostline\config`
/// On macOS: `~/Library/Application Support/io.ghostline.Ghostline`
/// On Linux: `~/.config/ghostline`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory where saved runs live.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> GhostConfig {
    config_dir()
        .and_then(|dir| std::fs::read_to_string(dir.join("config.toml")).ok())
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> Result<GhostConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ReplayError::Config(format!("{}: {e}", path.display())))
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &GhostConfig) -> Result<()> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Saves the configuration to an explicit path.
pub fn save_to(config: &GhostConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| ReplayError::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}
