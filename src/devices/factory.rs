//! Sensor construction from configuration
//!
//! A [`SensorConfig`] names a sensor type and its bus addressing; a
//! [`BusProvider`] hands out bus handles for whichever backend the process
//! runs on. [`SensorDevice`] is the closed set of drivers that can come out
//! of the factory.

use crate::devices::bmp180::{Bmp180, Oversampling};
use crate::devices::dht::{Dht, DhtTiming, DhtVariant};
use crate::devices::pir::Pir;
use crate::devices::traits::{
    BusFamily, Measurement, Outcome, Sensor, SensorError, SensorResult, SensorType,
    UnknownSensorType,
};
use crate::devices::tsl2561::{LightConfig, Tsl2561};
use crate::platform::traits::{GpioInterface, I2cInterface};
use serde::Deserialize;

/// Name used when a configuration does not give one
pub const DEFAULT_SENSOR_NAME: &str = "no_name";

/// Source of bus handles for constructed sensors
pub trait BusProvider {
    type Gpio: GpioInterface;
    type I2c: I2cInterface;

    /// Handle to the GPIO chip
    fn gpio(&self) -> Self::Gpio;

    /// Handle to the I2C bus
    fn i2c(&self) -> Self::I2c;

    /// Pulse thresholds and retry policy for bit-banged sensors
    fn dht_timing(&self) -> DhtTiming {
        DhtTiming::default()
    }
}

/// Declarative description of one sensor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Type string, e.g. "DHT22"
    #[serde(rename = "type")]
    pub sensor_type: String,

    /// GPIO line offset (DHT11, DHT22, PIR)
    #[serde(default)]
    pub pin: Option<u8>,

    /// 7-bit slave address (BMP180, TSL2561)
    #[serde(default)]
    pub address: Option<u16>,

    /// BMP180 oversampling setting, 0..=3
    #[serde(default)]
    pub oversampling: Option<u8>,

    /// TSL2561 gain, integration time and package
    #[serde(default)]
    pub light: LightConfig,
}

fn default_name() -> String {
    DEFAULT_SENSOR_NAME.to_string()
}

impl SensorConfig {
    /// GPIO sensor on `pin`
    pub fn gpio(name: &str, sensor_type: SensorType, pin: u8) -> Self {
        Self {
            pin: Some(pin),
            ..Self::bare(name, sensor_type)
        }
    }

    /// I2C sensor at `address`
    pub fn i2c(name: &str, sensor_type: SensorType, address: u16) -> Self {
        Self {
            address: Some(address),
            ..Self::bare(name, sensor_type)
        }
    }

    fn bare(name: &str, sensor_type: SensorType) -> Self {
        Self {
            name: name.to_string(),
            sensor_type: sensor_type.to_string(),
            pin: None,
            address: None,
            oversampling: None,
            light: LightConfig::default(),
        }
    }

    /// Validate the configuration and build the driver
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for an unknown type string, a GPIO type
    /// without `pin`, an I2C type without `address`, or an oversampling
    /// setting above 3.
    pub fn build<P: BusProvider>(&self, buses: &P) -> SensorResult<SensorDevice<P::Gpio, P::I2c>> {
        let sensor_type: SensorType = self
            .sensor_type
            .parse()
            .map_err(|e: UnknownSensorType| SensorError::InvalidValue(e.to_string()))?;
        let name = self.name.as_str();

        let device = match sensor_type.bus() {
            BusFamily::Gpio => {
                let pin = self.pin.ok_or_else(|| {
                    SensorError::InvalidValue(
                        "a valid pin property is required for GPIO sensor".into(),
                    )
                })?;
                match sensor_type {
                    SensorType::Dht11 | SensorType::Dht22 => {
                        let variant = if sensor_type == SensorType::Dht11 {
                            DhtVariant::Dht11
                        } else {
                            DhtVariant::Dht22
                        };
                        SensorDevice::Dht(
                            Dht::new(name, pin, variant, buses.gpio())
                                .with_timing(buses.dht_timing()),
                        )
                    }
                    _ => SensorDevice::Pir(Pir::new(name, pin, buses.gpio())),
                }
            }
            BusFamily::I2c => {
                let address = self.address.ok_or_else(|| {
                    SensorError::InvalidValue(
                        "a valid address property is required for I2C sensor".into(),
                    )
                })?;
                match sensor_type {
                    SensorType::Bmp180 => {
                        let oversampling = self.oversampling()?;
                        SensorDevice::Bmp180(
                            Bmp180::new(name, address, buses.i2c())
                                .with_oversampling(oversampling),
                        )
                    }
                    _ => SensorDevice::Tsl2561(
                        Tsl2561::new(name, address, buses.i2c()).with_config(self.light),
                    ),
                }
            }
        };

        crate::log_debug!("built {} sensor '{}'", sensor_type, name);
        Ok(device)
    }

    fn oversampling(&self) -> SensorResult<Oversampling> {
        match self.oversampling {
            None => Ok(Oversampling::default()),
            Some(bits) => Oversampling::from_bits(bits).ok_or_else(|| {
                SensorError::InvalidValue(format!(
                    "oversampling must be between 0 and 3, got {}",
                    bits
                ))
            }),
        }
    }
}

/// Any sensor the factory can build
pub enum SensorDevice<G: GpioInterface, I: I2cInterface> {
    Dht(Dht<G>),
    Pir(Pir<G>),
    Bmp180(Bmp180<I>),
    Tsl2561(Tsl2561<I>),
}

impl<G: GpioInterface, I: I2cInterface> SensorDevice<G, I> {
    fn as_sensor(&self) -> &dyn Sensor {
        match self {
            SensorDevice::Dht(s) => s,
            SensorDevice::Pir(s) => s,
            SensorDevice::Bmp180(s) => s,
            SensorDevice::Tsl2561(s) => s,
        }
    }

    fn as_sensor_mut(&mut self) -> &mut dyn Sensor {
        match self {
            SensorDevice::Dht(s) => s,
            SensorDevice::Pir(s) => s,
            SensorDevice::Bmp180(s) => s,
            SensorDevice::Tsl2561(s) => s,
        }
    }
}

impl<G: GpioInterface, I: I2cInterface> Sensor for SensorDevice<G, I> {
    fn name(&self) -> &str {
        self.as_sensor().name()
    }

    fn sensor_type(&self) -> SensorType {
        self.as_sensor().sensor_type()
    }

    fn prepare(&mut self) -> SensorResult<()> {
        self.as_sensor_mut().prepare()
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        self.as_sensor_mut().fetch()
    }

    fn fetch_or_error(&mut self) -> Outcome {
        self.as_sensor_mut().fetch_or_error()
    }
}

/// Scripted buses shared by every sensor built from one provider
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    pub gpio: crate::platform::mock::MockGpio,
    pub i2c: crate::platform::mock::MockI2c,
    pub timing: DhtTiming,
}

#[cfg(any(test, feature = "mock"))]
impl BusProvider for MockBus {
    type Gpio = crate::platform::mock::MockGpio;
    type I2c = crate::platform::mock::MockI2c;

    fn gpio(&self) -> Self::Gpio {
        self.gpio.clone()
    }

    fn i2c(&self) -> Self::I2c {
        self.i2c.clone()
    }

    fn dht_timing(&self) -> DhtTiming {
        self.timing
    }
}

/// Linux character-device GPIO and `/dev/i2c-N`
#[cfg(feature = "linux")]
#[derive(Debug, Clone)]
pub struct LinuxBus {
    pub gpio_chip: String,
    pub i2c_bus: String,
    pub timing: DhtTiming,
}

#[cfg(feature = "linux")]
impl BusProvider for LinuxBus {
    type Gpio = crate::platform::linux::LinuxGpio;
    type I2c = crate::platform::linux::LinuxI2c;

    fn gpio(&self) -> Self::Gpio {
        crate::platform::linux::LinuxGpio::new(&self.gpio_chip)
    }

    fn i2c(&self) -> Self::I2c {
        crate::platform::linux::LinuxI2c::new(&self.i2c_bus)
    }

    fn dht_timing(&self) -> DhtTiming {
        self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::ErrorCode;
    use crate::devices::tsl2561::{registers::TSL2561_ADDR, Gain};
    use crate::platform::mock::{MockGpio, MockI2c};

    fn build(config: &SensorConfig) -> SensorResult<SensorDevice<MockGpio, MockI2c>> {
        config.build(&MockBus::default())
    }

    #[test]
    fn test_build_each_type() {
        let cases = [
            (SensorConfig::gpio("a", SensorType::Dht11, 4), SensorType::Dht11),
            (SensorConfig::gpio("b", SensorType::Dht22, 4), SensorType::Dht22),
            (SensorConfig::gpio("c", SensorType::Pir, 23), SensorType::Pir),
            (SensorConfig::i2c("d", SensorType::Bmp180, 0x77), SensorType::Bmp180),
            (SensorConfig::i2c("e", SensorType::Tsl2561, 0x39), SensorType::Tsl2561),
        ];

        for (config, expected) in cases {
            let device = build(&config).unwrap();
            assert_eq!(device.sensor_type(), expected);
            assert_eq!(device.name(), config.name);
        }
    }

    #[test]
    fn test_gpio_sensor_requires_pin() {
        let config = SensorConfig::i2c("x", SensorType::Dht22, 0x40);

        let err = build(&config).err().unwrap();

        assert_eq!(err.code(), ErrorCode::InvalidValue);
        assert_eq!(
            err.message(),
            "a valid pin property is required for GPIO sensor"
        );
    }

    #[test]
    fn test_i2c_sensor_requires_address() {
        let config = SensorConfig::gpio("x", SensorType::Tsl2561, 4);

        let err = build(&config).err().unwrap();

        assert_eq!(
            err.message(),
            "a valid address property is required for I2C sensor"
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut config = SensorConfig::gpio("x", SensorType::Dht22, 4);
        config.sensor_type = "SHT31".into();

        let err = build(&config).err().unwrap();

        assert_eq!(err.message(), "'SHT31' is not a valid sensor type");
    }

    #[test]
    fn test_oversampling_out_of_range() {
        let mut config = SensorConfig::i2c("p", SensorType::Bmp180, 0x77);
        config.oversampling = Some(4);

        assert!(build(&config).is_err());

        config.oversampling = Some(3);
        match build(&config).unwrap() {
            SensorDevice::Bmp180(bmp) => {
                assert_eq!(bmp.oversampling(), Oversampling::UltraHighResolution)
            }
            _ => panic!("expected BMP180"),
        }
    }

    #[test]
    fn test_config_from_toml() {
        let config: SensorConfig = toml::from_str(
            r#"
            type = "tsl2561"
            address = 0x39

            [light]
            gain = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.name, DEFAULT_SENSOR_NAME);
        assert_eq!(config.address, Some(TSL2561_ADDR));
        assert_eq!(config.light.gain, Gain::Low);
        assert_eq!(build(&config).unwrap().sensor_type(), SensorType::Tsl2561);
    }

    #[test]
    fn test_device_delegates_fetch_or_error() {
        let buses = MockBus::default();
        buses.i2c.fail_open("No such file or directory");
        let mut device = SensorConfig::i2c("p", SensorType::Bmp180, 0x77)
            .build(&buses)
            .unwrap();

        let outcome = device.fetch_or_error();

        assert_eq!(outcome.error().map(|e| e.code()), Some(ErrorCode::FileError));
    }
}
