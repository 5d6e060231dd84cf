//! raspi_sensors - Sensor polling for single-board computers
//!
//! This library provides bus access, sensor drivers and a polling scheduler
//! for DHT11/DHT22, BMP180, TSL2561 and PIR sensors attached to GPIO and
//! I2C.

// Core services: logging macros and the polling scheduler
pub mod core;

// Platform abstraction layer (GPIO, I2C, init-once state)
pub mod platform;

// Sensor capability, drivers and factory
pub mod devices;

// Configuration file loading
pub mod parameters;
