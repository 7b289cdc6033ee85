//! Daemon configuration file
//!
//! JSON file holding the activity override registry and the list of window
//! titles the policy never touches.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::overrides::{OverrideEntry, OverrideRegistry};
use crate::constants::config::{APP_DIR, DEFAULT_PROFILE, FALLBACK_PROFILE, FILENAME};
use crate::constants::validation::{MAX_RESOLVE_TIMEOUT_MS, MIN_RESOLVE_TIMEOUT_MS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Activity name → overrides; `Fallback` applies when no name matches
    #[serde(default = "default_activity_overrides")]
    pub activity_overrides: OverrideRegistry,

    /// Windows with exactly these titles are ignored
    #[serde(default = "default_ignore_window_titles")]
    pub ignore_window_titles: Vec<String>,

    /// How long to wait for the activity name before dropping the event
    #[serde(default = "default_name_resolution_timeout_ms")]
    pub name_resolution_timeout_ms: u64,

    /// Shrink quick-tiled windows to half the usable desktop
    #[serde(default = "default_tile_heuristic")]
    pub tile_heuristic: bool,
}

fn default_activity_overrides() -> OverrideRegistry {
    let mut registry = OverrideRegistry::new();
    registry.insert(DEFAULT_PROFILE, OverrideEntry::default());
    registry.insert(
        FALLBACK_PROFILE,
        OverrideEntry {
            padding: Some(12),
            ..Default::default()
        },
    );
    registry
}

fn default_ignore_window_titles() -> Vec<String> {
    vec!["Plasma".to_string(), "Yakuake".to_string()]
}

fn default_name_resolution_timeout_ms() -> u64 {
    2000
}

fn default_tile_heuristic() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            activity_overrides: default_activity_overrides(),
            ignore_window_titles: default_ignore_window_titles(),
            name_resolution_timeout_ms: default_name_resolution_timeout_ms(),
            tile_heuristic: default_tile_heuristic(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(FILENAME);
        path
    }

    /// Load configuration from `path` (or the default path), creating it if missing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !config_path.exists() {
            info!(path = %config_path.display(), "Config file not found, creating default config");
            let config = Config::default();
            config.save(&config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        let config = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?;

        info!(
            path = %config_path.display(),
            activities = config.activity_overrides.len(),
            ignored_titles = config.ignore_window_titles.len(),
            "Loaded config"
        );
        if config.activity_overrides.is_empty() {
            info!("No activity overrides configured, using detected sidebar only");
        }
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(contents: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(contents).context("Invalid config JSON")?;
        config.validate_and_clamp();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;

        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.name_resolution_timeout_ms)
    }

    /// Exact title match against the ignore list
    pub fn is_ignored(&self, caption: &str) -> bool {
        self.ignore_window_titles.iter().any(|title| title == caption)
    }

    fn validate_and_clamp(&mut self) {
        let timeout = self
            .name_resolution_timeout_ms
            .clamp(MIN_RESOLVE_TIMEOUT_MS, MAX_RESOLVE_TIMEOUT_MS);
        if timeout != self.name_resolution_timeout_ms {
            warn!(
                name_resolution_timeout_ms = self.name_resolution_timeout_ms,
                min = MIN_RESOLVE_TIMEOUT_MS,
                max = MAX_RESOLVE_TIMEOUT_MS,
                "name_resolution_timeout_ms out of range, clamping"
            );
            self.name_resolution_timeout_ms = timeout;
        }

        let before = self.ignore_window_titles.len();
        self.ignore_window_titles.retain(|title| !title.is_empty());
        if self.ignore_window_titles.len() != before {
            warn!("empty entries in ignore_window_titles dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Side;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("sidebar-keeper-test-{}-{}", std::process::id(), name))
            .join(FILENAME)
    }

    #[test]
    fn test_defaults_match_shipped_overrides() {
        let config = Config::default();
        assert_eq!(config.activity_overrides.resolve("Default"), OverrideEntry::default());
        assert_eq!(config.activity_overrides.resolve("Other").padding, Some(12));
        assert!(config.is_ignored("Plasma"));
        assert!(config.is_ignored("Yakuake"));
        assert!(!config.is_ignored("Yakuake - Terminal"));
        assert!(config.tile_heuristic);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_overrides() {
        let json = r#"{
            "activity_overrides": {
                "Work": {"side": "right", "width": 200},
                "Fallback": {"padding": 0}
            },
            "ignore_window_titles": [],
            "tile_heuristic": false
        }"#;
        let config = Config::from_json(json).unwrap();

        let work = config.activity_overrides.resolve("Work");
        assert_eq!(work.side, Some(Side::Right));
        assert_eq!(work.width, Some(200));
        assert_eq!(config.activity_overrides.resolve("Elsewhere").padding, Some(0));
        assert!(config.ignore_window_titles.is_empty());
        assert!(!config.tile_heuristic);
    }

    #[test]
    fn test_timeout_is_clamped() {
        let low = Config::from_json(r#"{"name_resolution_timeout_ms": 1}"#).unwrap();
        assert_eq!(low.name_resolution_timeout_ms, MIN_RESOLVE_TIMEOUT_MS);

        let high = Config::from_json(r#"{"name_resolution_timeout_ms": 999999999}"#).unwrap();
        assert_eq!(high.resolve_timeout(), Duration::from_millis(MAX_RESOLVE_TIMEOUT_MS));
    }

    #[test]
    fn test_empty_ignored_titles_dropped() {
        let config = Config::from_json(r#"{"ignore_window_titles": ["", "Plasma"]}"#).unwrap();
        assert_eq!(config.ignore_window_titles, vec!["Plasma".to_string()]);
        assert!(!config.is_ignored(""));
    }

    #[test]
    fn test_invalid_side_is_an_error() {
        let json = r#"{"activity_overrides": {"Default": {"side": "top"}}}"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn test_load_creates_missing_file_then_reads_it_back() {
        let path = temp_config_path("roundtrip");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        let created = Config::load(Some(&path)).unwrap();
        assert!(path.exists());

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(created, loaded);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
