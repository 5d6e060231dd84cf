//! BMP180 I2C driver

use super::registers;
use crate::devices::bus::RegisterDevice;
use crate::devices::traits::{
    Measurement, MeasurementKind, Sensor, SensorError, SensorResult, SensorType,
};
use crate::platform::traits::I2cInterface;
use raspi_sensors_core::bmp180::{
    self, Calibration, Oversampling, CALIBRATION_BYTES, TEMPERATURE_COMMAND,
    TEMPERATURE_WAIT_US,
};

/// BMP180 driver
///
/// Calibration is read on the first successful `prepare` and kept for the
/// lifetime of the driver.
pub struct Bmp180<I: I2cInterface> {
    name: String,
    device: RegisterDevice<I>,
    oversampling: Oversampling,
    calibration: Option<Calibration>,
}

impl<I: I2cInterface> Bmp180<I> {
    pub fn new(name: &str, address: u16, bus: I) -> Self {
        Self {
            name: name.to_string(),
            device: RegisterDevice::new(bus, address),
            oversampling: Oversampling::default(),
            calibration: None,
        }
    }

    pub fn with_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn address(&self) -> u16 {
        self.device.address()
    }

    pub fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    fn read_calibration(&mut self) -> SensorResult<Calibration> {
        let mut block = [0u8; CALIBRATION_BYTES];
        self.device.read_block(registers::CALIB_START, &mut block)?;
        Ok(Calibration::from_bytes(&block)?)
    }

    fn read_raw_temperature(&mut self) -> SensorResult<i32> {
        self.device
            .write_u8(registers::CTRL_MEAS, TEMPERATURE_COMMAND)?;
        self.device.delay_us(TEMPERATURE_WAIT_US)?;

        let mut out = [0u8; registers::TEMPERATURE_LEN];
        self.device.read_block(registers::OUT_MSB, &mut out)?;
        Ok(bmp180::uncompensated_temperature(out[0], out[1]))
    }

    fn read_raw_pressure(&mut self) -> SensorResult<i32> {
        let oss = self.oversampling;
        self.device
            .write_u8(registers::CTRL_MEAS, oss.pressure_command())?;
        self.device.delay_us(oss.pressure_wait_us())?;

        let mut out = [0u8; registers::PRESSURE_LEN];
        self.device.read_block(registers::OUT_MSB, &mut out)?;
        Ok(bmp180::uncompensated_pressure(out[0], out[1], out[2], oss))
    }
}

impl<I: I2cInterface> Sensor for Bmp180<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Bmp180
    }

    fn prepare(&mut self) -> SensorResult<()> {
        if self.calibration.is_none() {
            let calibration = self.read_calibration()?;
            crate::log_info!(
                "{}: BMP180 calibration loaded from {:#04x}",
                self.name,
                self.device.address()
            );
            crate::log_debug!("{}: {:?}", self.name, calibration);
            self.calibration = Some(calibration);
        }
        Ok(())
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        let calibration = self
            .calibration
            .ok_or_else(|| SensorError::InvalidValue("BMP180 calibration not loaded".into()))?;

        // Pressure compensation needs this cycle's temperature
        let temperature = calibration.temperature(self.read_raw_temperature()?)?;
        let up = self.read_raw_pressure()?;
        let pressure = calibration.pressure(up, &temperature, self.oversampling)?;

        Ok(vec![
            Measurement::new(MeasurementKind::Temperature, temperature.celsius()),
            Measurement::new(MeasurementKind::Pressure, pressure as f64),
        ])
    }
}
