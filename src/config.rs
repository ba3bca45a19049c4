use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::partition::RangePolicy;
use crate::wizard::PreparationOrder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportSettings,
}

/// What a CSV selection produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvOutput {
    /// Write the xlsx workbook regardless of the chosen format
    #[default]
    Workbook,
    /// Write one CSV file per tab
    PerTab,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub preparation_order: PreparationOrder,
    #[serde(default)]
    pub range_policy: RangePolicy,
    #[serde(default)]
    pub csv_output: CsvOutput,
}

fn default_output_file_name() -> String {
    "output.xlsx".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_file_name: default_output_file_name(),
            output_dir: None,
            preparation_order: PreparationOrder::default(),
            range_policy: RangePolicy::default(),
            csv_output: CsvOutput::default(),
        }
    }
}

impl ExportSettings {
    /// Where the workbook is written
    pub fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&self.output_file_name),
            None => PathBuf::from(&self.output_file_name),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("grid-export")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".grid-export")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded export settings: {:?}", config.export);
        Ok(config)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.export.output_path(), PathBuf::from("output.xlsx"));
        assert_eq!(config.export.preparation_order, PreparationOrder::AfterSave);
        assert_eq!(config.export.range_policy, RangePolicy::Inclusive);
        assert_eq!(config.export.csv_output, CsvOutput::Workbook);
    }

    #[test]
    fn test_parses_partial_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[export]\npreparation_order = \"concurrent\"\nrange_policy = \"legacy\"\ncsv_output = \"per_tab\"\noutput_dir = \"/tmp/exports\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.export.preparation_order, PreparationOrder::Concurrent);
        assert_eq!(config.export.range_policy, RangePolicy::Legacy);
        assert_eq!(config.export.csv_output, CsvOutput::PerTab);
        assert_eq!(
            config.export.output_path(),
            PathBuf::from("/tmp/exports/output.xlsx")
        );
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\nrange_policy = \"sideways\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
