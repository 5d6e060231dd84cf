//! Consumer-facing records
//!
//! Flat, serializable views of an [`Outcome`]: one [`ResultRecord`] per
//! measurement, or a single [`ErrorRecord`].

use crate::devices::traits::{
    Measurement, MeasurementKind, Outcome, SensorError, SensorType, Value,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One measurement with its units and origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub unit: &'static str,
    pub unit_display: &'static str,
    pub value: Value,
    pub date: DateTime<Utc>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub sensor_name: String,
    pub sensor_type: SensorType,
}

impl ResultRecord {
    pub fn new(measurement: &Measurement, sensor_name: &str, sensor_type: SensorType) -> Self {
        let kind = measurement.kind();
        let value = match kind {
            MeasurementKind::Other => Value::Integer(0),
            _ => measurement.value(),
        };
        Self {
            kind: kind.label(),
            unit: kind.unit(),
            unit_display: kind.unit_display(),
            value,
            date: measurement.timestamp(),
            timestamp: measurement.timestamp().timestamp_millis(),
            sensor_name: sensor_name.to_string(),
            sensor_type,
        }
    }
}

/// A failed fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub cause: String,
    pub code: u8,
}

impl From<&SensorError> for ErrorRecord {
    fn from(error: &SensorError) -> Self {
        Self {
            cause: error.message().to_string(),
            code: error.code().as_u8(),
        }
    }
}

/// Records produced by one outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Results(Vec<ResultRecord>),
    Error(ErrorRecord),
}

impl Records {
    pub fn from_outcome(outcome: &Outcome, sensor_name: &str, sensor_type: SensorType) -> Self {
        match outcome.as_result() {
            Ok(measurements) => Records::Results(
                measurements
                    .iter()
                    .map(|m| ResultRecord::new(m, sensor_name, sensor_type))
                    .collect(),
            ),
            Err(error) => Records::Error(error.into()),
        }
    }
}
