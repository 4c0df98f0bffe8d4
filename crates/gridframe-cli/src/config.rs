//! Command-line configuration.
//!
//! Stored in `~/.gridframe/config.toml`. Every field is optional in the file;
//! missing values fall back to the defaults below, and command-line flags
//! override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridframeConfig {
    pub per_unit: PerUnitConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerUnitConfig {
    /// Read and write tables in per-unit by default.
    pub enabled: bool,

    /// Base apparent power in MVA.
    pub power_base: f64,
}

impl Default for PerUnitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            power_base: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for floating point cells.
    pub decimal_places: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { decimal_places: 4 }
    }
}

/// Effective options of one invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub per_unit: bool,
    pub power_base: f64,
    pub decimal_places: usize,
}

impl GridframeConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".gridframe"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from the default location, or defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the file to use: an explicit path must exist, the default
    /// location may be absent.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Merge command-line overrides into the file values.
    pub fn settings(&self, per_unit: bool, power_base: Option<f64>) -> Settings {
        Settings {
            per_unit: per_unit || self.per_unit.enabled,
            power_base: power_base.unwrap_or(self.per_unit.power_base),
            decimal_places: self.display.decimal_places,
        }
    }

    /// Target for `config init`.
    pub fn target_path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| anyhow!("could not determine config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_default_config() {
        let config = GridframeConfig::default();
        assert!(!config.per_unit.enabled);
        assert_eq!(config.per_unit.power_base, 100.0);
        assert_eq!(config.display.decimal_places, 4);
    }

    #[test]
    fn test_partial_config_parsing() {
        let toml = r#"
            [per_unit]
            enabled = true
        "#;
        let config: GridframeConfig = toml::from_str(toml).unwrap();
        assert!(config.per_unit.enabled);
        assert_eq!(config.per_unit.power_base, 100.0);
        assert_eq!(config.display.decimal_places, 4);
    }

    #[test]
    fn test_save_and_load() {
        let mut config = GridframeConfig::default();
        config.per_unit.power_base = 250.0;
        config.display.decimal_places = 2;

        let file = NamedTempFile::new().unwrap();
        config.save_to(file.path()).unwrap();
        let loaded = GridframeConfig::load_from(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_flags_override_the_file() {
        let mut config = GridframeConfig::default();
        config.per_unit.power_base = 250.0;

        let settings = config.settings(false, None);
        assert!(!settings.per_unit);
        assert_eq!(settings.power_base, 250.0);

        let settings = config.settings(true, Some(50.0));
        assert!(settings.per_unit);
        assert_eq!(settings.power_base, 50.0);

        config.per_unit.enabled = true;
        assert!(config.settings(false, None).per_unit);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(GridframeConfig::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("config.toml");
        GridframeConfig::default().save_to(&nested).unwrap();
        assert!(nested.exists());
    }
}
