//! Device drivers
//!
//! This module contains the sensor drivers, written against the platform
//! bus traits so they run unchanged on Linux and on the mock backends.
//!
//! ## Modules
//!
//! - `traits`: Sensor capability, measurements, outcomes and errors
//! - `bus`: Register access over I2C, one transaction per call
//! - `dht`: DHT11/DHT22 humidity and temperature (GPIO)
//! - `bmp180`: BMP180 pressure and temperature (I2C)
//! - `tsl2561`: TSL2561 ambient light (I2C)
//! - `pir`: PIR motion detector (GPIO)
//! - `factory`: Sensor construction from configuration
//! - `record`: Serializable result and error records

pub mod bmp180;
pub mod bus;
pub mod dht;
pub mod factory;
pub mod pir;
pub mod record;
pub mod traits;
pub mod tsl2561;

pub use factory::{BusProvider, SensorConfig, SensorDevice};
pub use traits::{Outcome, Sensor, SensorType};
