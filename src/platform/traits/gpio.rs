//! GPIO interface trait
//!
//! This module defines the GPIO (General Purpose Input/Output) interface that
//! bus backends must provide. Pins are addressed by their BCM line number.

use crate::platform::{traits::TimerInterface, Result};

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Output mode (push-pull)
    Output,
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// GPIO interface trait
///
/// # Safety Invariants
///
/// - `initialize` must succeed before any other call
/// - Only one sensor drives a given pin
/// - Pin number must be valid for the chip
pub trait GpioInterface: TimerInterface + Send {
    /// Perform the process-wide GPIO library initialization
    ///
    /// Idempotent: only the first successful call touches the hardware,
    /// even under concurrent first use.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::Init)` if the GPIO chip
    /// cannot be opened.
    fn initialize(&mut self) -> Result<()>;

    /// Set GPIO pin mode
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio` if the line cannot be requested in
    /// the given mode.
    fn set_mode(&mut self, pin: u8, mode: GpioMode) -> Result<()>;

    /// Drive an output pin
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin
    /// is not configured as an output.
    fn write(&mut self, pin: u8, level: Level) -> Result<()>;

    /// Sample a pin
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio` if the line has not been requested.
    fn read(&mut self, pin: u8) -> Result<Level>;
}
