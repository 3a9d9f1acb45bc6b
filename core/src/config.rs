use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::calculator::{SolarEventCalculator, DEFAULT_REFINEMENT_PASSES, DEFAULT_SEARCH_LIMIT_DAYS};
use crate::error::SolarError;
use crate::event::Twilight;
use crate::location::Location;
use crate::solar::SolarModel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse Error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation Error: {0}")]
    Validation(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub model: SolarModel,
    #[serde(default = "default_search_limit_days")]
    pub search_limit_days: u32,
    #[serde(default = "default_refinement_passes")]
    pub refinement_passes: u32,
    /// Depression used for dawn and dusk when none is given.
    #[serde(default = "default_twilight_depression")]
    pub twilight_depression: f64,
}

fn default_search_limit_days() -> u32 {
    DEFAULT_SEARCH_LIMIT_DAYS
}

fn default_refinement_passes() -> u32 {
    DEFAULT_REFINEMENT_PASSES
}

fn default_twilight_depression() -> f64 {
    Twilight::Civil.depression()
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            model: SolarModel::default(),
            search_limit_days: DEFAULT_SEARCH_LIMIT_DAYS,
            refinement_passes: DEFAULT_REFINEMENT_PASSES,
            twilight_depression: default_twilight_depression(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(lat), Some(lon)) = (self.location.latitude, self.location.longitude) {
            Location::new(lat, lon).map_err(|e| ConfigError::Validation(e.to_string()))?;
        } else if self.location.latitude.is_some() != self.location.longitude.is_some() {
            return Err(ConfigError::Validation(
                "latitude and longitude must be set together".to_string(),
            ));
        }

        let calc = &self.calculator;
        if calc.search_limit_days == 0 {
            return Err(ConfigError::Validation("search_limit_days must be at least 1".to_string()));
        }
        if calc.refinement_passes == 0 {
            return Err(ConfigError::Validation("refinement_passes must be at least 1".to_string()));
        }
        if !(0.0..90.0).contains(&calc.twilight_depression) {
            return Err(ConfigError::Validation(format!(
                "twilight_depression {} is outside [0, 90)",
                calc.twilight_depression
            )));
        }

        Ok(())
    }

    pub fn calculator(&self) -> SolarEventCalculator {
        SolarEventCalculator::new()
            .with_model(self.calculator.model)
            .with_search_limit_days(self.calculator.search_limit_days)
            .with_refinement_passes(self.calculator.refinement_passes)
    }

    /// The configured location, if both coordinates are present.
    pub fn location(&self) -> Option<Result<Location, SolarError>> {
        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Some(Location::new(lat, lon)),
            _ => None,
        }
    }
}
