use crate::layout::{
    LayoutOptions, SlotLabelStyle, TimeRange, DEFAULT_CELL_HEIGHT, DEFAULT_END_HOUR,
    DEFAULT_START_HOUR,
};
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pixels per hour row.
    pub cell_height: f64,
    pub default_start_hour: i32,
    pub default_end_hour: i32,
    pub compact_labels: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_height: DEFAULT_CELL_HEIGHT,
            default_start_hour: DEFAULT_START_HOUR,
            default_end_hour: DEFAULT_END_HOUR,
            compact_labels: false,
        }
    }
}

impl LayoutConfig {
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            cell_height: self.cell_height,
            base_hour: None,
            baseline: TimeRange {
                start_hour: self.default_start_hour,
                end_hour: self.default_end_hour,
            },
            label_style: if self.compact_labels {
                SlotLabelStyle::Compact
            } else {
                SlotLabelStyle::Full
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Replace stored classes on import instead of appending.
    pub replace_existing: bool,
}

impl Config {
    /// Load from `config_path`, writing the defaults there if it does not exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Update one setting from its dotted key, e.g. `layout.cell_height`.
    ///
    /// The config is left untouched when the new value is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "layout.cell_height" => updated.layout.cell_height = parse_value(key, value)?,
            "layout.default_start_hour" => {
                updated.layout.default_start_hour = parse_value(key, value)?
            }
            "layout.default_end_hour" => updated.layout.default_end_hour = parse_value(key, value)?,
            "layout.compact_labels" => updated.layout.compact_labels = parse_value(key, value)?,
            "import.replace_existing" => {
                updated.import.replace_existing = parse_value(key, value)?
            }
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if !(layout.cell_height.is_finite() && layout.cell_height > 0.0) {
            return Err(anyhow!("layout.cell_height must be a positive number"));
        }
        if !(0..=24).contains(&layout.default_start_hour)
            || !(0..=24).contains(&layout.default_end_hour)
            || layout.default_start_hour > layout.default_end_hour
        {
            return Err(anyhow!(
                "layout hours must satisfy 0 <= default_start_hour <= default_end_hour <= 24"
            ));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| anyhow!("Invalid value '{}' for {}", value, key))
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "classgrid", "classgrid")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
