//! Settings loaded from `config.toml` in the app data directory.
//!
//! Priority: environment variables > config file > defaults. Command-line
//! flags are applied on top by the binary.

use crate::index::types::IndexConfig;
use crate::query::backend::BackendKind;
use crate::utils::app_data::get_app_data_dir;
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

const CONFIG_FILE: &str = "config.toml";

/// Configuration file format (TOML)
/// Located at ~/Library/Application Support/fuzzdex/config.toml (macOS)
/// or %LOCALAPPDATA%/fuzzdex/config.toml (Windows)
/// or ~/.local/share/fuzzdex/config.toml (Linux)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub index: IndexConfigFile,
    #[serde(default)]
    pub search: SearchConfigFile,
    #[serde(default)]
    pub watcher: WatcherConfigFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfigFile {
    pub max_file_size: Option<u64>,
    pub ignored_dirs: Option<Vec<String>>,
    pub parallel_build: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfigFile {
    pub default_distance: Option<usize>,
    pub backend: Option<BackendKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatcherConfigFile {
    pub debounce_ms: Option<u64>,
}

/// Query defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Distance used when a query has no `/N` suffix
    pub default_distance: usize,
    pub backend: BackendKind,
}

/// Configuration for the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Changes within this window are batched
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl WatcherConfig {
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Effective settings after merging every source
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub watcher: WatcherConfig,
}

impl Settings {
    /// Load with priority: environment variables > config file > defaults.
    ///
    /// A config file that fails to parse is reported and ignored.
    pub fn load() -> Result<Self> {
        let path = get_app_data_dir()?.join(CONFIG_FILE);
        let mut settings = Self::default();
        match read_config_file(&path) {
            Ok(Some(file)) => settings.apply_file(file),
            Ok(None) => {}
            Err(e) => warn!("ignoring {}: {e:#}", path.display()),
        }
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.index.max_file_size {
            self.index.max_file_size = v;
        }
        if let Some(v) = file.index.ignored_dirs {
            self.index.ignored_dirs = v;
        }
        if let Some(v) = file.index.parallel_build {
            self.index.parallel_build = v;
        }
        if let Some(v) = file.search.default_distance {
            self.search.default_distance = v;
        }
        if let Some(v) = file.search.backend {
            self.search.backend = v;
        }
        if let Some(v) = file.watcher.debounce_ms {
            self.watcher.debounce_ms = v;
        }
    }

    /// Apply `FUZZDEX_*` overrides. Unparsable values are skipped with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("FUZZDEX_DEBOUNCE_MS") {
            match val.parse() {
                Ok(ms) => self.watcher.debounce_ms = ms,
                Err(_) => warn!("ignoring FUZZDEX_DEBOUNCE_MS={val:?}"),
            }
        }
        if let Some(val) = lookup("FUZZDEX_DEFAULT_DISTANCE") {
            match val.parse() {
                Ok(d) => self.search.default_distance = d,
                Err(_) => warn!("ignoring FUZZDEX_DEFAULT_DISTANCE={val:?}"),
            }
        }
        if let Some(val) = lookup("FUZZDEX_BACKEND") {
            match val.parse() {
                Ok(kind) => self.search.backend = kind,
                Err(e) => warn!("ignoring FUZZDEX_BACKEND: {e}"),
            }
        }
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    let file = toml::from_str(&content).context("Failed to parse config file")?;
    Ok(Some(file))
}
