//! Configuration loading
//!
//! Reads the TOML file, applies environment overrides, then validates.

use super::app::AppConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides `[gpio] chip`
pub const ENV_GPIO_CHIP: &str = "RASPI_SENSORS_GPIO_CHIP";

/// Overrides `[i2c] bus`
pub const ENV_I2C_BUS: &str = "RASPI_SENSORS_I2C_BUS";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable '{key}' is not valid unicode")]
    Env { key: &'static str },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl AppConfig {
    /// Load `path`, apply environment overrides and validate
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`].
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;

        crate::log_info!(
            "loaded {} sensor entries from {}",
            config.sensors.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse TOML without touching the environment
    pub fn parse(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Replace bus paths with the ones set in the environment
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Some(chip) = read_env(ENV_GPIO_CHIP)? {
            crate::log_debug!("{} overrides GPIO chip: {}", ENV_GPIO_CHIP, chip);
            self.gpio.chip = chip;
        }
        if let Some(bus) = read_env(ENV_I2C_BUS)? {
            crate::log_debug!("{} overrides I2C bus: {}", ENV_I2C_BUS, bus);
            self.i2c.bus = bus;
        }
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        let timing = &self.gpio.timing;
        if timing.timeout_polls == 0 {
            return Err(ConfigError::Invalid(
                "gpio.timing.timeout_polls must be at least 1".into(),
            ));
        }
        if timing.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "gpio.timing.max_attempts must be at least 1".into(),
            ));
        }
        if self.gpio.chip.is_empty() || self.i2c.bus.is_empty() {
            return Err(ConfigError::Invalid("bus device paths must not be empty".into()));
        }
        Ok(())
    }
}

fn read_env(key: &'static str) -> ConfigResult<Option<String>> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::Env { key }),
    }
}
