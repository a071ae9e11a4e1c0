//! Centralized path definitions for all files the engine writes.
//!
//! This module is the single source of truth for leaf filenames and directory
//! names. No other module should hard-code these strings.
//!
//! Functions accept `&Path` so they work for both the CLI and embedders that
//! manage their own config directory.

use std::path::{Path, PathBuf};

// ── Application identity ─────────────────────────────────────────

pub const APP_ID: &str = "com.pocketassist.engine";

// ── Leaf filenames ───────────────────────────────────────────────

pub const SETTINGS_FILE: &str = "settings.json";

// ── Directory names ──────────────────────────────────────────────

pub const COMMAND_LOGS_DIR: &str = "command-logs";

// ── Config-dir functions (take config_dir) ───────────────────────

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

pub fn command_logs_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(COMMAND_LOGS_DIR)
}

/// Platform default config dir: `<os config dir>/com.pocketassist.engine`.
pub fn default_config_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        std::env::var("APPDATA")
            .map_or_else(|_| PathBuf::from("C:\\Users\\Default\\AppData\\Roaming"), PathBuf::from)
    } else if cfg!(target_os = "macos") {
        home_dir().join("Library/Application Support")
    } else {
        std::env::var("XDG_CONFIG_HOME")
            .map_or_else(|_| home_dir().join(".config"), PathBuf::from)
    };
    base.join(APP_ID)
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(|_| PathBuf::from("."), PathBuf::from)
}
