use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{ApiKey, Coordinates, FieldSets, TIMELINES_ENDPOINT, Units};

/// Location used until the user picks one.
pub const DEFAULT_LOCATION: Coordinates = Coordinates::new(37.3333, -122.0068);

/// Persisted user settings.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = 1
/// timezone = "Europe/Zurich"
///
/// [location]
/// latitude = 47.3769
/// longitude = 8.5417
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tomorrow.io API key.
    pub api_key: Option<String>,

    /// Timelines endpoint, overridable for testing against a local server.
    pub endpoint: String,

    /// `0` imperial, `1` metric, `2` host default; unset follows the host locale.
    pub units: Option<Units>,

    /// IANA timezone; unset follows the host.
    pub timezone: Option<String>,

    /// Location shown on the home screen.
    pub location: Coordinates,

    pub saved_locations: Vec<Coordinates>,

    pub fields: FieldSets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: TIMELINES_ENDPOINT.to_string(),
            units: None,
            timezone: None,
            location: DEFAULT_LOCATION,
            saved_locations: Vec::new(),
            fields: FieldSets::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(ApiKey::new)
    }

    /// Add a saved location; returns `false` if it was already saved.
    pub fn save_location(&mut self, location: Coordinates) -> bool {
        if self.saved_locations.contains(&location) {
            return false;
        }
        self.saved_locations.push(location);
        true
    }

    /// Remove a saved location; returns `false` if it was not saved.
    pub fn forget_location(&mut self, location: Coordinates) -> bool {
        let before = self.saved_locations.len();
        self.saved_locations.retain(|l| *l != location);
        self.saved_locations.len() != before
    }
}
