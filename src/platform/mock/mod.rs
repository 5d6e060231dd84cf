//! Mock bus backends for testing
//!
//! This module provides mock implementations of the platform traits that
//! can drive every sensor driver without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use raspi_sensors::platform::mock::MockI2c;
//! use raspi_sensors::platform::traits::I2cInterface;
//!
//! let mut bus = MockI2c::default();
//! bus.set_registers(0x39, 0x8C, &[0x10, 0x00]);
//! bus.open().unwrap();
//! bus.select_slave(0x39).unwrap();
//! bus.close();
//! assert_eq!(bus.open_count(), 1);
//! ```

#![cfg(any(test, feature = "mock"))]

mod gpio;
mod i2c;

pub use gpio::{GpioEvent, MockGpio, Waveform, MOCK_PIN_COUNT};
pub use i2c::{I2cTransaction, MockI2c};
