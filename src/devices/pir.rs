//! PIR motion sensor
//!
//! The module drives its output high while motion is detected; a single
//! digital read is the whole protocol.

use crate::devices::traits::{Measurement, MeasurementKind, Sensor, SensorResult, SensorType};
use crate::platform::traits::{GpioInterface, GpioMode};

/// PIR driver
pub struct Pir<G: GpioInterface> {
    name: String,
    pin: u8,
    gpio: G,
}

impl<G: GpioInterface> Pir<G> {
    pub fn new(name: &str, pin: u8, gpio: G) -> Self {
        Self {
            name: name.to_string(),
            pin,
            gpio,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl<G: GpioInterface> Sensor for Pir<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Pir
    }

    fn prepare(&mut self) -> SensorResult<()> {
        self.gpio.initialize()?;
        Ok(())
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        self.gpio.set_mode(self.pin, GpioMode::Input)?;
        let detected = self.gpio.read(self.pin)?.is_high();

        Ok(vec![Measurement::new(
            MeasurementKind::Detection,
            i64::from(detected),
        )])
    }
}
