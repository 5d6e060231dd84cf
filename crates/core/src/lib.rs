//! raspi_sensors_core - Pure no_std decoding logic for raspi_sensors
//!
//! This crate contains the bus-independent half of every sensor driver:
//! bit framing, checksums and fixed-point compensation. Everything here
//! operates on plain integers so it can be tested on the host without
//! any GPIO or I2C backend.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Integer math**: Vendor compensation formulas reproduced bit-exactly
//!
//! # Modules
//!
//! - [`dht`]: DHT11/DHT22 single-wire frame assembly and decoding
//! - [`bmp180`]: BMP180 calibration block and temperature/pressure compensation
//! - [`tsl2561`]: TSL2561 channel scaling and piecewise lux approximation
//! - [`scheduler`]: Per-task execution statistics

#![no_std]

pub mod bmp180;
pub mod dht;
pub mod scheduler;
pub mod tsl2561;
