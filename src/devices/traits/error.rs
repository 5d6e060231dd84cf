//! Sensor error model
//!
//! Every fault a sensor can raise collapses into one of four kinds. The
//! numeric [`ErrorCode`] is what result consumers see next to the message.

use crate::platform::PlatformError;
use raspi_sensors_core::bmp180::CompensationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for sensor operations
pub type SensorResult<T> = core::result::Result<T, SensorError>;

/// Numeric error code exposed to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    /// Never populated; reserved for default-constructed values
    #[default]
    None = 0,
    FileError = 1,
    I2cError = 2,
    GpioError = 3,
    InvalidValue = 4,
}

impl ErrorCode {
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Sensor-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The bus device could not be opened or accessed
    #[error("{0}")]
    File(String),
    /// Slave selection or a transfer on the I2C bus failed
    #[error("{0}")]
    I2c(String),
    /// The GPIO subsystem failed
    #[error("{0}")]
    Gpio(String),
    /// The sensor answered, but not with anything decodable
    #[error("{0}")]
    InvalidValue(String),
}

impl SensorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SensorError::File(_) => ErrorCode::FileError,
            SensorError::I2c(_) => ErrorCode::I2cError,
            SensorError::Gpio(_) => ErrorCode::GpioError,
            SensorError::InvalidValue(_) => ErrorCode::InvalidValue,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SensorError::File(m)
            | SensorError::I2c(m)
            | SensorError::Gpio(m)
            | SensorError::InvalidValue(m) => m,
        }
    }
}

impl From<PlatformError> for SensorError {
    fn from(err: PlatformError) -> Self {
        let message = err.to_string();
        match err {
            PlatformError::Open { .. } => SensorError::File(message),
            PlatformError::I2c(_) => SensorError::I2c(message),
            PlatformError::Gpio(_) => SensorError::Gpio(message),
        }
    }
}

impl From<CompensationError> for SensorError {
    fn from(err: CompensationError) -> Self {
        SensorError::InvalidValue(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{GpioError, I2cError};

    #[test]
    fn test_platform_error_mapping() {
        let open = PlatformError::Open {
            path: "/dev/i2c-1".into(),
            reason: "Permission denied".into(),
        };
        let err = SensorError::from(open);
        assert_eq!(err.code(), ErrorCode::FileError);
        assert_eq!(err.message(), "Failed to open the bus /dev/i2c-1: Permission denied");

        let err = SensorError::from(PlatformError::I2c(I2cError::NotOpen));
        assert_eq!(err.code(), ErrorCode::I2cError);

        let err = SensorError::from(PlatformError::Gpio(GpioError::InvalidPin(99)));
        assert_eq!(err.code(), ErrorCode::GpioError);
        assert_eq!(err.to_string(), "GPIO error: invalid pin 99");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::default().as_u8(), 0);
        assert_eq!(ErrorCode::FileError.as_u8(), 1);
        assert_eq!(ErrorCode::I2cError.as_u8(), 2);
        assert_eq!(ErrorCode::GpioError.as_u8(), 3);
        assert_eq!(ErrorCode::InvalidValue.as_u8(), 4);
    }

    #[test]
    fn test_compensation_error_is_invalid_value() {
        let err = SensorError::from(CompensationError::DivisionByZero);
        assert_eq!(err.code(), ErrorCode::InvalidValue);
    }
}
