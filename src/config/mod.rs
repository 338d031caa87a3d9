use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::editor::PendingPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// What to do with a request made while another one is already queued
    #[serde(default)]
    pub pending_policy: PendingPolicy,

    #[serde(default)]
    pub export_dir: Option<String>,

    #[serde(default)]
    pub log_dir: Option<String>,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .and_then(expand_path)
            .or_else(|| data_dir().map(|dir| dir.join("exports")))
            .unwrap_or_else(|| PathBuf::from(".pbmetrics").join("exports"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .as_deref()
            .and_then(expand_path)
            .or_else(|| data_dir().map(|dir| dir.join("logs")))
            .unwrap_or_else(|| PathBuf::from(".pbmetrics").join("logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or("info")
    }
}

/// Load the config file. A missing file is the default config; a file that
/// exists but does not parse is an error.
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("PBMETRICS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("pbmetrics").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("pbmetrics").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "pbmetrics", "pbmetrics")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("pbmetrics"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("pbmetrics"));
    }
    directories::ProjectDirs::from("io", "pbmetrics", "pbmetrics")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}
