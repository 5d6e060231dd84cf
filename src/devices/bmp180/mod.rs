//! BMP180 barometric pressure and temperature sensor
//!
//! I2C, address 0x77. Compensation math lives in
//! `raspi_sensors_core::bmp180`.

mod driver;
pub mod registers;

pub use driver::Bmp180;
pub use raspi_sensors_core::bmp180::Oversampling;
