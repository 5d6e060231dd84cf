//! Configuration sections

use crate::core::scheduler::SchedulerConfig;
use crate::devices::dht::DhtTiming;
use crate::devices::SensorConfig;
use serde::Deserialize;
use std::time::Duration;

/// Default GPIO character device
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

/// Default I2C bus device
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub gpio: GpioConfig,
    pub i2c: I2cConfig,
    pub sensors: Vec<SensorEntry>,
}

/// `[gpio]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub chip: String,
    pub timing: DhtTimingConfig,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chip: DEFAULT_GPIO_CHIP.to_string(),
            timing: DhtTimingConfig::default(),
        }
    }
}

/// `[gpio.timing]` section
///
/// The pulse thresholds depend on how fast the host polls the line, so
/// they are tunable per board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DhtTimingConfig {
    pub timeout_polls: u32,
    pub high_threshold_us: u32,
    pub max_attempts: u32,
    pub retry_delay_ms: u32,
}

impl Default for DhtTimingConfig {
    fn default() -> Self {
        let timing = DhtTiming::default();
        Self {
            timeout_polls: timing.timeout_polls,
            high_threshold_us: timing.high_threshold_us,
            max_attempts: timing.max_attempts,
            retry_delay_ms: timing.retry_delay_ms,
        }
    }
}

impl From<DhtTimingConfig> for DhtTiming {
    fn from(config: DhtTimingConfig) -> Self {
        DhtTiming {
            timeout_polls: config.timeout_polls,
            high_threshold_us: config.high_threshold_us,
            max_attempts: config.max_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

/// `[i2c]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct I2cConfig {
    pub bus: String,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            bus: DEFAULT_I2C_BUS.to_string(),
        }
    }
}

/// One `[[sensors]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorEntry {
    #[serde(flatten)]
    pub sensor: SensorConfig,

    /// Seconds between fetches; 0 fetches once
    #[serde(default)]
    pub interval_secs: u64,
}

impl SensorEntry {
    /// Polling period, `None` for a one-shot fetch
    pub fn interval(&self) -> Option<Duration> {
        match self.interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
