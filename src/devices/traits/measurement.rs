//! Measurement types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical quantity a measurement reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementKind {
    Temperature,
    Pressure,
    Humidity,
    Light,
    Detection,
    Other,
}

impl MeasurementKind {
    /// Display name of the quantity
    pub fn label(self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "Temperature",
            MeasurementKind::Pressure => "Pressure",
            MeasurementKind::Humidity => "Humidity",
            MeasurementKind::Light => "Light",
            MeasurementKind::Detection => "Detection",
            MeasurementKind::Other => "Other",
        }
    }

    /// Unit name
    pub fn unit(self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "Degree Celsius",
            MeasurementKind::Pressure => "Pascal",
            MeasurementKind::Humidity => "Percent",
            MeasurementKind::Light => "Lux",
            MeasurementKind::Detection => "Boolean",
            MeasurementKind::Other => "-",
        }
    }

    /// Unit symbol
    pub fn unit_display(self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "°C",
            MeasurementKind::Pressure => "Pa",
            MeasurementKind::Humidity => "%",
            MeasurementKind::Light => "Lux",
            MeasurementKind::Detection => "Boolean",
            MeasurementKind::Other => "",
        }
    }
}

/// Measured value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Integer(v) => v as f64,
            Value::Float(v) => v,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// One timestamped reading
///
/// The timestamp is taken when the measurement is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    kind: MeasurementKind,
    value: Value,
    timestamp: DateTime<Utc>,
}

impl Measurement {
    pub fn new(kind: MeasurementKind, value: impl Into<Value>) -> Self {
        Self::at(kind, value, Utc::now())
    }

    pub fn at(kind: MeasurementKind, value: impl Into<Value>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            value: value.into(),
            timestamp,
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_fixed_at_construction() {
        let before = Utc::now();
        let m = Measurement::new(MeasurementKind::Light, 120i64);
        let after = Utc::now();

        assert!(m.timestamp() >= before && m.timestamp() <= after);
        assert_eq!(m.value(), Value::Integer(120));
        assert_eq!(m.kind(), MeasurementKind::Light);
    }

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Integer(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::Float(21.5)).unwrap(), "21.5");
        assert_eq!(Value::Integer(7).as_f64(), 7.0);
    }

    #[test]
    fn test_unit_mapping() {
        assert_eq!(MeasurementKind::Temperature.unit_display(), "°C");
        assert_eq!(MeasurementKind::Humidity.unit(), "Percent");
        assert_eq!(MeasurementKind::Other.unit(), "-");
        assert_eq!(MeasurementKind::Other.unit_display(), "");
    }
}
