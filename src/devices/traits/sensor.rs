//! Sensor capability trait
//!
//! Drivers implement `prepare` and `fetch` with ordinary fallible returns.
//! `fetch_or_error` is the single point where those failures become data.

use super::{Measurement, Outcome, SensorResult};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bus a sensor family is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFamily {
    Gpio,
    I2c,
}

/// Supported sensor families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorType {
    /// Humidity/temperature, integral resolution
    Dht11,
    /// Humidity/temperature, 0.1 resolution
    Dht22,
    /// Pressure/temperature
    Bmp180,
    /// Ambient light
    Tsl2561,
    /// Passive infrared motion
    Pir,
}

impl SensorType {
    pub const ALL: [SensorType; 5] = [
        SensorType::Dht11,
        SensorType::Dht22,
        SensorType::Bmp180,
        SensorType::Tsl2561,
        SensorType::Pir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Dht11 => "DHT11",
            SensorType::Dht22 => "DHT22",
            SensorType::Bmp180 => "BMP180",
            SensorType::Tsl2561 => "TSL2561",
            SensorType::Pir => "PIR",
        }
    }

    pub fn bus(self) -> BusFamily {
        match self {
            SensorType::Dht11 | SensorType::Dht22 | SensorType::Pir => BusFamily::Gpio,
            SensorType::Bmp180 | SensorType::Tsl2561 => BusFamily::I2c,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type string that names no supported sensor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid sensor type")]
pub struct UnknownSensorType(pub String);

impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSensorType(s.to_string()))
    }
}

/// Sensor capability
///
/// Implementors report faults through `prepare` and `fetch`; callers that
/// need a value rather than control flow use `fetch_or_error`.
pub trait Sensor: Send {
    /// Immutable instance name
    fn name(&self) -> &str;

    fn sensor_type(&self) -> SensorType;

    /// Per-cycle setup (bus initialization, calibration, power-up)
    fn prepare(&mut self) -> SensorResult<()>;

    /// Protocol read producing measurements in a fixed order
    fn fetch(&mut self) -> SensorResult<Vec<Measurement>>;

    /// Run `prepare` then `fetch`, capturing any failure in the outcome
    fn fetch_or_error(&mut self) -> Outcome {
        let result = self.prepare().and_then(|()| self.fetch());
        if let Err(e) = &result {
            crate::log_warn!(
                "{} ({}): fetch failed [{}]: {}",
                self.name(),
                self.sensor_type(),
                e.code().as_u8(),
                e
            );
        }
        Outcome::from(result)
    }
}

impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sensor_type(&self) -> SensorType {
        (**self).sensor_type()
    }

    fn prepare(&mut self) -> SensorResult<()> {
        (**self).prepare()
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        (**self).fetch()
    }

    fn fetch_or_error(&mut self) -> Outcome {
        (**self).fetch_or_error()
    }
}
