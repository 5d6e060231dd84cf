//! I2C interface trait
//!
//! This module defines the I2C bus interface that backends must provide.
//! It mirrors the Linux `/dev/i2c-N` model: a handle is opened, bound to a
//! slave address, used for plain writes and reads, then closed.

use crate::platform::{traits::TimerInterface, Result};

/// I2C interface trait
///
/// # Safety Invariants
///
/// - `select_slave` must follow a successful `open`
/// - Address must be 7-bit (valid range: 0x00..=0x7F)
/// - Transfers on one handle are not interleaved between threads
pub trait I2cInterface: TimerInterface + Send {
    /// Path of the bus device node, for diagnostics
    fn bus_path(&self) -> &str;

    /// Open the bus device node
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Open` if the device node cannot be opened.
    fn open(&mut self) -> Result<()>;

    /// Release the bus device node; a no-op when not open
    fn close(&mut self);

    /// Bind subsequent transfers to a slave address
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::I2c(I2cError::SlaveSelect)` if the adapter
    /// rejects the address.
    fn select_slave(&mut self, address: u16) -> Result<()>;

    /// Write `data` to the selected slave
    ///
    /// Performs a complete transaction: START - ADDR(W) - DATA - STOP
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::I2c` if:
    /// - Device does not acknowledge (NACK)
    /// - Fewer bytes than requested were written
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Fill `buffer` from the selected slave
    ///
    /// Performs a complete transaction: START - ADDR(R) - DATA - STOP
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::I2c` if:
    /// - Device does not acknowledge (NACK)
    /// - Fewer bytes than requested were read
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()>;
}
