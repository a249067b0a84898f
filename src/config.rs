//! Player settings and where to find them.
//!
//! Settings are read-only configuration (step sizes, overlay timing, keymap,
//! group names). Nothing is ever written back.
//!
//! Lookup priority for `vidplay.json`:
//! 1. Explicit directory from the host
//! 2. `VIDPLAY_CONFIG_DIR` environment variable
//! 3. Current directory, IF `vidplay.json` exists there
//! 4. Platform config directory from dirs-next
//!
//! Platform paths:
//! - Linux: ~/.config/vidplay/vidplay.json
//! - macOS: ~/Library/Application Support/vidplay/vidplay.json
//! - Windows: %APPDATA%\vidplay\vidplay.json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::overlay_timer::{DEFAULT_INTERVAL_MS, PAUSE_INTERVAL_MS};
use crate::core::shortcuts::Keymap;

/// Settings file name
pub const SETTINGS_FILE: &str = "vidplay.json";

/// Environment override for the config directory
pub const CONFIG_DIR_ENV: &str = "VIDPLAY_CONFIG_DIR";

/// Configuration for overriding the default settings location
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from host or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: explicit dir -> ENV var (VIDPLAY_CONFIG_DIR) -> None (use defaults)
    pub fn from_env_and_override(dir: Option<PathBuf>) -> Self {
        let config_dir = dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path of the settings file for `config`
pub fn settings_file(config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(SETTINGS_FILE)
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir()
        && current_dir.join(SETTINGS_FILE).exists()
    {
        return current_dir;
    }

    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("vidplay");
    }

    PathBuf::from(".")
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    // Seeking
    pub seek_step_secs: f64, // Arrow/button seek step (default 5s)

    // Volume
    pub volume_step: f64,    // Up/down step (default 0.10)
    pub mute_threshold: f64, // Volume below this after a step down mutes (default 1e-10)

    // Overlay
    pub overlay_interval_ms: u64,       // Auto-hide after seek/volume/mute (default 1000)
    pub pause_overlay_interval_ms: u64, // Auto-hide after pause (default 500)

    // Registry groups
    pub controller_group: String,

    // Input
    pub keymap: Keymap,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            seek_step_secs: 5.0,
            volume_step: 0.10,
            mute_threshold: 1e-10,
            overlay_interval_ms: DEFAULT_INTERVAL_MS,
            pause_overlay_interval_ms: PAUSE_INTERVAL_MS,
            controller_group: "videoPlayer".to_string(),
            keymap: Keymap::default(),
        }
    }
}

impl PlayerSettings {
    /// Load from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the location resolved by `config`
    pub fn from_config(config: &PathConfig) -> Result<Self> {
        Self::load(&settings_file(config))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(raw).context("Invalid settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0,
            "seek_step_secs must be positive, got {}",
            self.seek_step_secs
        );
        anyhow::ensure!(
            self.volume_step > 0.0 && self.volume_step <= 1.0,
            "volume_step must be in (0, 1], got {}",
            self.volume_step
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.mute_threshold),
            "mute_threshold must be in [0, 1), got {}",
            self.mute_threshold
        );
        anyhow::ensure!(!self.controller_group.is_empty(), "controller_group must not be empty");
        Ok(())
    }
}
