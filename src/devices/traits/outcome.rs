//! Fetch outcome
//!
//! An [`Outcome`] holds either a non-empty list of measurements or exactly
//! one error. The representation is private so that invariant cannot be
//! broken from outside this module.

use super::{Measurement, SensorError, SensorResult};

#[derive(Debug, Clone, PartialEq)]
enum Inner {
    Results(Vec<Measurement>),
    Error(SensorError),
}

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome(Inner);

impl Outcome {
    /// Wrap measurements; an empty list becomes an `InvalidValue` error
    pub fn from_measurements(measurements: Vec<Measurement>) -> Self {
        if measurements.is_empty() {
            return Self::from_error(SensorError::InvalidValue(
                "sensor returned no measurements".into(),
            ));
        }
        Outcome(Inner::Results(measurements))
    }

    pub fn from_error(error: SensorError) -> Self {
        Outcome(Inner::Error(error))
    }

    pub fn has_results(&self) -> bool {
        matches!(self.0, Inner::Results(_))
    }

    pub fn has_error(&self) -> bool {
        matches!(self.0, Inner::Error(_))
    }

    /// Measurements, empty when the outcome is an error
    pub fn results(&self) -> &[Measurement] {
        match &self.0 {
            Inner::Results(m) => m,
            Inner::Error(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&SensorError> {
        match &self.0 {
            Inner::Results(_) => None,
            Inner::Error(e) => Some(e),
        }
    }

    /// Borrowing view for exhaustive matching
    pub fn as_result(&self) -> Result<&[Measurement], &SensorError> {
        match &self.0 {
            Inner::Results(m) => Ok(m),
            Inner::Error(e) => Err(e),
        }
    }

    pub fn into_result(self) -> SensorResult<Vec<Measurement>> {
        match self.0 {
            Inner::Results(m) => Ok(m),
            Inner::Error(e) => Err(e),
        }
    }
}

impl From<SensorResult<Vec<Measurement>>> for Outcome {
    fn from(result: SensorResult<Vec<Measurement>>) -> Self {
        match result {
            Ok(measurements) => Outcome::from_measurements(measurements),
            Err(error) => Outcome::from_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::{ErrorCode, MeasurementKind};

    #[test]
    fn test_results_and_error_are_exclusive() {
        let cases = [
            Outcome::from_measurements(vec![Measurement::new(MeasurementKind::Detection, 1i64)]),
            Outcome::from_measurements(Vec::new()),
            Outcome::from_error(SensorError::Gpio("init".into())),
            Outcome::from(Err(SensorError::File("open".into()))),
            Outcome::from(Ok(vec![
                Measurement::new(MeasurementKind::Temperature, 15.0),
                Measurement::new(MeasurementKind::Pressure, 69964.0),
            ])),
        ];

        for outcome in &cases {
            assert_ne!(outcome.has_results(), outcome.has_error());
            assert_eq!(outcome.has_results(), !outcome.results().is_empty());
            assert_eq!(outcome.has_error(), outcome.error().is_some());
        }
        assert!(cases[0].has_results());
        assert!(cases[2].has_error());
        assert_eq!(cases[4].results().len(), 2);
    }

    #[test]
    fn test_empty_measurements_become_invalid_value() {
        let outcome = Outcome::from_measurements(Vec::new());

        assert_eq!(outcome.error().map(SensorError::code), Some(ErrorCode::InvalidValue));
    }

    #[test]
    fn test_into_result_preserves_order() {
        let outcome = Outcome::from_measurements(vec![
            Measurement::new(MeasurementKind::Humidity, 40.0),
            Measurement::new(MeasurementKind::Temperature, 21.0),
        ]);
        let kinds: Vec<_> = outcome
            .into_result()
            .unwrap()
            .iter()
            .map(Measurement::kind)
            .collect();

        assert_eq!(
            kinds,
            vec![MeasurementKind::Humidity, MeasurementKind::Temperature]
        );
    }
}
