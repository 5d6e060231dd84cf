//! Platform abstraction layer
//!
//! This module provides bus access for the sensor drivers. Every
//! OS-specific call is isolated behind the traits in [`traits`]; drivers
//! never touch a device node directly.

pub mod error;
pub mod init;
pub mod traits;

// Backend implementations (feature-gated)
#[cfg(feature = "linux")]
pub mod linux;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{GpioError, I2cError, PlatformError, Result};
pub use init::InitGate;
pub use traits::{GpioInterface, GpioMode, I2cInterface, Level, TimerInterface};
