use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::{read_json, write_json, StorageError};

// ── Routine timeouts ─────────────────────────────────────────────

/// Detection and completion windows for one routine kind, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoutineTimeouts {
    pub detection_ms: u64,
    pub completion_ms: u64,
}

impl RoutineTimeouts {
    pub const fn new(detection_ms: u64, completion_ms: u64) -> Self {
        Self {
            detection_ms,
            completion_ms,
        }
    }

    pub fn detection(&self) -> Duration {
        Duration::from_millis(self.detection_ms)
    }

    pub fn completion(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }
}

impl Default for RoutineTimeouts {
    fn default() -> Self {
        Self::new(5_000, 5_000)
    }
}

fn default_qr_scan() -> RoutineTimeouts {
    RoutineTimeouts::new(10_000, 10_000)
}

fn default_upi_confirmation() -> RoutineTimeouts {
    RoutineTimeouts::new(15_000, 15_000)
}

/// Timeouts per well-known routine channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoutineSettings {
    #[serde(default)]
    pub quick_settings: RoutineTimeouts,
    #[serde(default)]
    pub payment: RoutineTimeouts,
    #[serde(default = "default_qr_scan")]
    pub qr_scan: RoutineTimeouts,
    #[serde(default = "default_upi_confirmation")]
    pub upi_confirmation: RoutineTimeouts,
}

impl Default for RoutineSettings {
    fn default() -> Self {
        Self {
            quick_settings: RoutineTimeouts::default(),
            payment: RoutineTimeouts::default(),
            qr_scan: default_qr_scan(),
            upi_confirmation: default_upi_confirmation(),
        }
    }
}

// ── Engine settings ──────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_music_match_threshold() -> f64 {
    0.55
}

fn default_back_navigation_delay_ms() -> u64 {
    800
}

fn default_true() -> bool {
    true
}

/// Engine settings stored in the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub routines: RoutineSettings,
    /// Minimum normalized similarity for a local track to count as a match.
    #[serde(default = "default_music_match_threshold")]
    pub music_match_threshold: f64,
    /// Delay before the observer navigates back from an automated screen.
    #[serde(default = "default_back_navigation_delay_ms")]
    pub back_navigation_delay_ms: u64,
    /// Append every executed directive to the JSONL command log.
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            routines: RoutineSettings::default(),
            music_match_threshold: default_music_match_threshold(),
            back_navigation_delay_ms: default_back_navigation_delay_ms(),
            audit_enabled: true,
        }
    }
}

impl EngineSettings {
    pub fn back_navigation_delay(&self) -> Duration {
        Duration::from_millis(self.back_navigation_delay_ms)
    }
}

/// Load settings from the config directory.
///
/// A missing file yields defaults. An unreadable or malformed file also yields
/// defaults (logged), so a bad edit never prevents the engine from starting.
pub fn load_settings(config_dir: &Path) -> EngineSettings {
    let path = crate::paths::settings_path(config_dir);
    if !path.exists() {
        return EngineSettings::default();
    }
    match read_json::<EngineSettings>(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            EngineSettings::default()
        }
    }
}

/// Save settings to the config directory.
pub fn save_settings(config_dir: &Path, settings: &EngineSettings) -> Result<(), StorageError> {
    std::fs::create_dir_all(config_dir)?;
    write_json(&crate::paths::settings_path(config_dir), settings)
}
