//! Device traits
//!
//! This module contains the hardware-independent contract shared by all
//! sensor drivers:
//! - The error taxonomy and numeric codes
//! - Measurements and fetch outcomes
//! - The `Sensor` capability trait

pub mod error;
pub mod measurement;
pub mod outcome;
pub mod sensor;

pub use error::{ErrorCode, SensorError, SensorResult};
pub use measurement::{Measurement, MeasurementKind, Value};
pub use outcome::Outcome;
pub use sensor::{BusFamily, Sensor, SensorType, UnknownSensorType};
