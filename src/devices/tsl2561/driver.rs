//! TSL2561 I2C driver

use super::registers::{self, command};
use crate::devices::bus::RegisterDevice;
use crate::devices::traits::{Measurement, MeasurementKind, Sensor, SensorResult, SensorType};
use crate::platform::traits::I2cInterface;
use raspi_sensors_core::tsl2561::{self, Gain, IntegrationTime, Package};
use serde::Deserialize;

/// Acquisition settings
///
/// The same values program the timing register and scale the channels,
/// so the lux formula always matches what the ADC was told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    #[serde(with = "gain_serde")]
    pub gain: Gain,
    #[serde(with = "integration_serde")]
    pub integration: IntegrationTime,
    #[serde(with = "package_serde")]
    pub package: Package,
}

impl LightConfig {
    /// TIMING register value
    pub fn timing(&self) -> u8 {
        self.gain.timing_bits() | self.integration.timing_bits()
    }
}

/// TSL2561 driver
pub struct Tsl2561<I: I2cInterface> {
    name: String,
    device: RegisterDevice<I>,
    config: LightConfig,
    powered: bool,
}

impl<I: I2cInterface> Tsl2561<I> {
    pub fn new(name: &str, address: u16, bus: I) -> Self {
        Self {
            name: name.to_string(),
            device: RegisterDevice::new(bus, address),
            config: LightConfig::default(),
            powered: false,
        }
    }

    pub fn with_config(mut self, config: LightConfig) -> Self {
        self.config = config;
        self
    }

    pub fn address(&self) -> u16 {
        self.device.address()
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    fn read_channel(&mut self, low: u8, high: u8) -> SensorResult<u16> {
        let lo = self.device.read_u8(command(low))?;
        let hi = self.device.read_u8(command(high))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

impl<I: I2cInterface> Sensor for Tsl2561<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Tsl2561
    }

    fn prepare(&mut self) -> SensorResult<()> {
        self.device
            .write_u8(command(registers::CONTROL), registers::POWER_ON)?;
        self.device
            .write_u8(command(registers::TIMING), self.config.timing())?;
        self.device.write_u8(
            command(registers::INTERRUPT),
            registers::INTERRUPT_DISABLED,
        )?;

        // The first conversion completes one integration period after power-up
        if !self.powered {
            self.device
                .delay_us(self.config.integration.duration_us())?;
            self.powered = true;
        }
        Ok(())
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        let ch0 = self.read_channel(registers::DATA0LOW, registers::DATA0HIGH)?;
        let ch1 = self.read_channel(registers::DATA1LOW, registers::DATA1HIGH)?;

        let lux = tsl2561::calculate_lux(
            ch0,
            ch1,
            self.config.gain,
            self.config.integration,
            self.config.package,
        );
        crate::log_trace!("{}: ch0={} ch1={} lux={}", self.name, ch0, ch1, lux);

        Ok(vec![Measurement::new(MeasurementKind::Light, lux as i64)])
    }
}

// Core enums stay serde-free; configuration spells them as strings.

mod gain_serde {
    use super::Gain;
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Gain, D::Error> {
        match u8::deserialize(d)? {
            1 => Ok(Gain::Low),
            16 => Ok(Gain::High),
            other => Err(D::Error::custom(format!("gain must be 1 or 16, got {}", other))),
        }
    }
}

mod integration_serde {
    use super::IntegrationTime;
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<IntegrationTime, D::Error> {
        match String::deserialize(d)?.as_str() {
            "13.7ms" | "13ms" => Ok(IntegrationTime::Short),
            "101ms" => Ok(IntegrationTime::Medium),
            "402ms" => Ok(IntegrationTime::Long),
            other => Err(D::Error::custom(format!(
                "integration must be 13.7ms, 101ms or 402ms, got {}",
                other
            ))),
        }
    }
}

mod package_serde {
    use super::Package;
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Package, D::Error> {
        match String::deserialize(d)?.to_ascii_uppercase().as_str() {
            "T" => Ok(Package::T),
            "CS" => Ok(Package::Cs),
            other => Err(D::Error::custom(format!("package must be T or CS, got {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::Value;
    use crate::platform::mock::MockI2c;
    use crate::platform::traits::TimerInterface;
    use registers::TSL2561_ADDR;

    fn bus_with_channels(ch0: u16, ch1: u16) -> MockI2c {
        let bus = MockI2c::default();
        let [c0l, c0h] = ch0.to_le_bytes();
        let [c1l, c1h] = ch1.to_le_bytes();
        bus.set_registers(TSL2561_ADDR, 0x8C, &[c0l, c0h, c1l, c1h]);
        bus
    }

    #[test]
    fn test_prepare_programs_device() {
        let bus = bus_with_channels(0, 0);
        let mut sensor = Tsl2561::new("lux", TSL2561_ADDR, bus.clone());
        sensor.prepare().unwrap();

        assert_eq!(
            bus.writes_to(TSL2561_ADDR),
            vec![vec![0x80, 0x03], vec![0x81, 0x11], vec![0x86, 0x00]]
        );
        assert_eq!(bus.now_us(), 101_000);

        sensor.prepare().unwrap();
        assert_eq!(bus.now_us(), 101_000);
    }

    #[test]
    fn test_default_reading() {
        let bus = bus_with_channels(1000, 200);
        let mut sensor = Tsl2561::new("lux", TSL2561_ADDR, bus);

        let results = sensor.fetch_or_error().into_result().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind(), MeasurementKind::Light);
        assert_eq!(results[0].value(), Value::Integer(100));
    }

    #[test]
    fn test_dark_reading_is_zero() {
        let mut sensor = Tsl2561::new("lux", TSL2561_ADDR, bus_with_channels(0, 0));

        let results = sensor.fetch_or_error().into_result().unwrap();

        assert_eq!(results[0].value(), Value::Integer(0));
    }

    #[test]
    fn test_low_gain_config_is_consistent() {
        let bus = bus_with_channels(100, 10);
        let config = LightConfig {
            gain: Gain::Low,
            integration: IntegrationTime::Short,
            package: Package::Cs,
        };
        let mut sensor = Tsl2561::new("lux", TSL2561_ADDR, bus.clone()).with_config(config);

        let results = sensor.fetch_or_error().into_result().unwrap();

        assert_eq!(bus.writes_to(TSL2561_ADDR)[1], vec![0x81, 0x00]);
        assert_eq!(results[0].value(), Value::Integer(1352));
    }

    #[test]
    fn test_light_config_from_toml() {
        let config: LightConfig =
            toml::from_str("gain = 1\nintegration = \"402ms\"\npackage = \"t\"").unwrap();

        assert_eq!(config.gain, Gain::Low);
        assert_eq!(config.integration, IntegrationTime::Long);
        assert_eq!(config.package, Package::T);
        assert_eq!(config.timing(), 0x02);

        assert!(toml::from_str::<LightConfig>("gain = 4").is_err());
    }
}
