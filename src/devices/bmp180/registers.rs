//! BMP180 Register Definitions
//!
//! Based on the Bosch BMP180 datasheet (BST-BMP180-DS000).

/// Fixed I2C address
pub const BMP180_ADDR: u16 = 0x77;

/// First calibration register (AC1 MSB); eleven words follow up to 0xBF
pub const CALIB_START: u8 = 0xAA;

/// Measurement control
pub const CTRL_MEAS: u8 = 0xF4;

/// Conversion result, most significant byte
pub const OUT_MSB: u8 = 0xF6;

/// Conversion result, least significant byte
pub const OUT_LSB: u8 = 0xF7;

/// Conversion result, extra bits for oversampled pressure
pub const OUT_XLSB: u8 = 0xF8;

/// Bytes in a temperature result (MSB, LSB)
pub const TEMPERATURE_LEN: usize = (OUT_LSB - OUT_MSB + 1) as usize;

/// Bytes in a pressure result (MSB, LSB, XLSB)
pub const PRESSURE_LEN: usize = (OUT_XLSB - OUT_MSB + 1) as usize;
