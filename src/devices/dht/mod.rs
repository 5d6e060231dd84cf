//! DHT11/DHT22 humidity and temperature sensors
//!
//! Single-wire, bit-banged over one GPIO pin. Framing and decoding live in
//! `raspi_sensors_core::dht`; this module drives the line and measures
//! pulse widths.

mod driver;

pub use driver::Dht;
pub use raspi_sensors_core::dht::{DhtTiming, DhtVariant};
