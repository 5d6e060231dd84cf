//! Platform error types
//!
//! This module defines error types for bus operations. Backends map their
//! OS-specific failures onto these variants; the sensor layer then folds
//! them into the four error kinds reported to consumers.

use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The bus device node could not be opened
    #[error("Failed to open the bus {path}: {reason}")]
    Open { path: String, reason: String },
    /// I2C operation failed
    #[error("I2C error: {0}")]
    I2c(#[from] I2cError),
    /// GPIO operation failed
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
}

/// I2C-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I2cError {
    /// Binding the bus handle to a slave address failed
    #[error("failed to select slave {address:#04x}: {reason}")]
    SlaveSelect { address: u16, reason: String },
    /// Fewer bytes were written than requested
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
    /// Fewer bytes were read than requested
    #[error("short read: {read} of {expected} bytes")]
    ShortRead { expected: usize, read: usize },
    /// Transfer rejected by the adapter (NACK, arbitration, timeout)
    #[error("transfer failed: {0}")]
    Transfer(String),
    /// Transfer attempted without an open, addressed bus
    #[error("bus is not open")]
    NotOpen,
}

/// GPIO-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// The GPIO library or chip could not be initialized
    #[error("initialization failed: {0}")]
    Init(String),
    /// Pin number not present on the chip
    #[error("invalid pin {0}")]
    InvalidPin(u8),
    /// Requesting or driving a line failed
    #[error("line {pin}: {reason}")]
    Line { pin: u8, reason: String },
    /// Operation not valid in the pin's current mode
    #[error("pin {pin} is not configured for this operation")]
    InvalidMode { pin: u8 },
}
