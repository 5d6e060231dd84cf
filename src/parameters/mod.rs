//! Process Configuration
//!
//! This module loads the TOML file that tells `sensord` which sensors to
//! poll and how.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        sensord.toml                     │
//! └──────────────┬─────────────────────────┘
//!                │ toml + serde
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        AppConfig                        │
//! │  - [scheduler] runtime sizing           │
//! │  - [gpio] chip and DHT timing           │
//! │  - [i2c] bus device                     │
//! │  - [[sensors]] one entry per sensor     │
//! └──────────────┬─────────────────────────┘
//!                │ environment overrides
//!                ▼
//! ┌────────────────────────────────────────┐
//! │   SensorConfig::build(BusProvider)      │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Example File
//!
//! ```toml
//! [scheduler]
//! worker_threads = 2
//! max_workers = 4
//!
//! [gpio]
//! chip = "/dev/gpiochip0"
//!
//! [gpio.timing]
//! high_threshold_us = 30
//!
//! [i2c]
//! bus = "/dev/i2c-1"
//!
//! [[sensors]]
//! name = "living_room"
//! type = "DHT22"
//! pin = 4
//! interval_secs = 10
//!
//! [[sensors]]
//! name = "barometer"
//! type = "BMP180"
//! address = 0x77
//! oversampling = 3
//! ```
//!
//! # Environment Overrides
//!
//! - `RASPI_SENSORS_GPIO_CHIP` - GPIO character device
//! - `RASPI_SENSORS_I2C_BUS` - I2C bus device

pub mod app;
pub mod loader;

pub use app::{AppConfig, DhtTimingConfig, GpioConfig, I2cConfig, SensorEntry};
pub use loader::{ConfigError, ConfigResult, ENV_GPIO_CHIP, ENV_I2C_BUS};
