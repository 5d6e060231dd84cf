//! TSL2561 ambient light sensor
//!
//! I2C, address 0x29, 0x39 (default) or 0x49. Lux reconstruction lives in
//! `raspi_sensors_core::tsl2561`.

mod driver;
pub mod registers;

pub use driver::{LightConfig, Tsl2561};
pub use raspi_sensors_core::tsl2561::{Gain, IntegrationTime, Package};
