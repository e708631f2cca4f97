//! Global moafinder configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HORIZON_DAYS;
use crate::error::{MoaError, MoaResult};
use crate::label::Language;

fn default_horizon_days() -> i64 {
    DEFAULT_HORIZON_DAYS
}

fn is_default_horizon_days(days: &i64) -> bool {
    *days == DEFAULT_HORIZON_DAYS
}

fn is_default_language(lang: &Language) -> bool {
    *lang == Language::default()
}

/// Configuration at ~/.config/moafinder/config.toml
///
/// Every key can be overridden with a `MOAFINDER_` environment variable,
/// e.g. `MOAFINDER_HORIZON_DAYS=30`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MoafinderConfig {
    /// How far ahead schedules are listed when no end date is given
    #[serde(
        default = "default_horizon_days",
        skip_serializing_if = "is_default_horizon_days"
    )]
    pub horizon_days: i64,

    /// Language of schedule labels
    #[serde(default, skip_serializing_if = "is_default_language")]
    pub language: Language,
}

impl Default for MoafinderConfig {
    fn default() -> Self {
        MoafinderConfig {
            horizon_days: DEFAULT_HORIZON_DAYS,
            language: Language::default(),
        }
    }
}

impl MoafinderConfig {
    pub fn config_path() -> MoaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MoaError::Config("Could not determine config directory".into()))?
            .join("moafinder");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, creating a commented-out default on first use.
    pub fn load() -> MoaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> MoaResult<Self> {
        let config: MoafinderConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("MOAFINDER"))
            .build()
            .map_err(|e| MoaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MoaError::Config(e.to_string()))?;

        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    fn validate(&self) -> MoaResult<()> {
        if self.horizon_days < 0 {
            return Err(MoaError::Config(format!(
                "horizon_days must not be negative, got {}",
                self.horizon_days
            )));
        }
        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> MoaResult<()> {
        let contents = format!(
            "\
# moafinder configuration

# Days ahead to list when no end date is given:
# horizon_days = {}

# Language for schedule labels (\"de\" or \"en\"):
# language = \"de\"
",
            DEFAULT_HORIZON_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MoaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MoaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
