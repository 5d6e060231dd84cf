//! DHT GPIO driver

use crate::devices::traits::{
    Measurement, MeasurementKind, Sensor, SensorError, SensorResult, SensorType,
};
use crate::platform::{
    traits::{GpioInterface, GpioMode, Level},
    Result,
};
use raspi_sensors_core::dht::{
    DhtReading, DhtTiming, DhtVariant, Frame, FrameAssembler, FrameError,
};

/// Host start signal: line held low
const START_LOW_MS: u32 = 18;

/// Host start signal: line released high before listening
const START_HIGH_US: u32 = 40;

/// Transitions before the first data bit (release, 80 us low, 80 us high)
const PREAMBLE_TRANSITIONS: usize = 3;

/// DHT11/DHT22 driver
pub struct Dht<G: GpioInterface> {
    name: String,
    pin: u8,
    variant: DhtVariant,
    gpio: G,
    timing: DhtTiming,
}

impl<G: GpioInterface> Dht<G> {
    pub fn new(name: &str, pin: u8, variant: DhtVariant, gpio: G) -> Self {
        Self {
            name: name.to_string(),
            pin,
            variant,
            gpio,
            timing: DhtTiming::default(),
        }
    }

    /// Override the pulse thresholds and retry policy
    pub fn with_timing(mut self, timing: DhtTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn variant(&self) -> DhtVariant {
        self.variant
    }

    pub fn timing(&self) -> &DhtTiming {
        &self.timing
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    fn start_signal(&mut self) -> Result<()> {
        self.gpio.set_mode(self.pin, GpioMode::Output)?;
        self.gpio.write(self.pin, Level::Low)?;
        self.gpio.delay_ms(START_LOW_MS)?;
        self.gpio.write(self.pin, Level::High)?;
        self.gpio.delay_us(START_HIGH_US)?;
        self.gpio.set_mode(self.pin, GpioMode::Input)
    }

    /// Wait until the line leaves `level` and return how long it held, in us
    ///
    /// The width comes from the bus clock, since a line read costs time of
    /// its own. Gives up with `None` after `timeout_polls` samples.
    fn pulse_width(&mut self, level: Level) -> Result<Option<u32>> {
        let start = self.gpio.now_us();
        let mut polls = 0;
        while self.gpio.read(self.pin)? == level {
            polls += 1;
            if polls >= self.timing.timeout_polls {
                return Ok(None);
            }
            self.gpio.delay_us(1)?;
        }
        let elapsed = self.gpio.now_us().saturating_sub(start);
        Ok(Some(u32::try_from(elapsed).unwrap_or(u32::MAX)))
    }

    /// One start-signal-and-listen cycle
    ///
    /// Bus faults are returned as the outer error; a timeout or bad
    /// checksum as the inner one.
    fn read_frame(&mut self) -> Result<core::result::Result<Frame, FrameError>> {
        self.start_signal()?;

        let mut level = Level::High;
        for _ in 0..PREAMBLE_TRANSITIONS {
            if self.pulse_width(level)?.is_none() {
                return Ok(Err(FrameError::Incomplete { bits: 0 }));
            }
            level = !level;
        }

        let mut assembler = FrameAssembler::new(self.timing.high_threshold_us);
        while !assembler.is_complete() {
            let high = match self.pulse_width(Level::Low)? {
                Some(_) => self.pulse_width(Level::High)?,
                None => None,
            };
            match high {
                Some(width) => {
                    assembler.push_pulse(width);
                }
                None => {
                    return Ok(Err(FrameError::Incomplete {
                        bits: assembler.bits(),
                    }))
                }
            }
        }
        Ok(assembler.finish())
    }

    fn read_with_retry(&mut self) -> SensorResult<DhtReading> {
        let attempts = self.timing.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.read_frame()? {
                Ok(frame) => {
                    crate::log_debug!(
                        "{}: frame {:02x?} on attempt {}",
                        self.name,
                        frame.bytes(),
                        attempt
                    );
                    return Ok(frame.decode(self.variant));
                }
                Err(e) => {
                    crate::log_debug!("{}: attempt {}/{} failed: {}", self.name, attempt, attempts, e);
                    if attempt < attempts {
                        self.gpio.delay_ms(self.timing.retry_delay_ms)?;
                    }
                }
            }
        }
        Err(SensorError::InvalidValue(format!(
            "Failed to read GPIO data after {} attempts",
            attempts
        )))
    }
}

impl<G: GpioInterface> Sensor for Dht<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        match self.variant {
            DhtVariant::Dht11 => SensorType::Dht11,
            DhtVariant::Dht22 => SensorType::Dht22,
        }
    }

    fn prepare(&mut self) -> SensorResult<()> {
        self.gpio.initialize()?;
        Ok(())
    }

    fn fetch(&mut self) -> SensorResult<Vec<Measurement>> {
        let reading = self.read_with_retry()?;
        Ok(vec![
            Measurement::new(MeasurementKind::Humidity, reading.humidity()),
            Measurement::new(MeasurementKind::Temperature, reading.temperature()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::{ErrorCode, Value};
    use crate::platform::mock::{MockGpio, Waveform};
    use crate::platform::traits::TimerInterface;
    use approx::assert_relative_eq;

    const PIN: u8 = 4;

    fn sensor(variant: DhtVariant) -> (Dht<MockGpio>, MockGpio) {
        let gpio = MockGpio::new();
        (Dht::new("porch", PIN, variant, gpio.clone()), gpio)
    }

    #[test]
    fn test_dht22_reading() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht22);
        gpio.queue_waveform(PIN, Waveform::dht_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]));

        let outcome = dht.fetch_or_error();
        let results = outcome.results();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind(), MeasurementKind::Humidity);
        assert_relative_eq!(results[0].value().as_f64(), 65.2);
        assert_eq!(results[1].kind(), MeasurementKind::Temperature);
        assert_relative_eq!(results[1].value().as_f64(), 35.1);
    }

    #[test]
    fn test_dht11_reading() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht11);
        gpio.queue_waveform(PIN, Waveform::dht_frame([0x37, 0x00, 0x18, 0x00, 0x4F]));

        let results = dht.fetch().map_err(|e| e.to_string());
        dht.prepare().unwrap();
        assert!(results.is_err(), "fetch before prepare must fail");

        gpio.queue_waveform(PIN, Waveform::dht_frame([0x37, 0x00, 0x18, 0x00, 0x4F]));
        let results = dht.fetch().unwrap();
        assert_eq!(results[0].value(), Value::Float(55.0));
        assert_eq!(results[1].value(), Value::Float(24.0));
    }

    #[test]
    fn test_start_signal_sequence() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht22);
        gpio.queue_waveform(PIN, Waveform::dht_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]));
        dht.fetch_or_error();

        let events = gpio.events();
        use crate::platform::mock::GpioEvent::*;
        assert!(matches!(events[0], Mode { pin: PIN, mode: GpioMode::Output, .. }));
        assert!(matches!(events[1], Write { level: Level::Low, at_us: 0, .. }));
        assert!(matches!(events[2], Write { level: Level::High, at_us: 18_000, .. }));
        assert!(matches!(events[3], Mode { mode: GpioMode::Input, at_us: 18_040, .. }));
    }

    #[test]
    fn test_success_on_later_attempt() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht22);
        gpio.queue_waveform(PIN, Waveform::dht_frame([0x02, 0x8C, 0x01, 0x5F, 0x00]));
        gpio.queue_waveform(PIN, Waveform::new());
        gpio.queue_waveform(PIN, Waveform::dht_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]));

        let outcome = dht.fetch_or_error();

        assert!(outcome.has_results());
        assert_eq!(gpio.input_switches(PIN), 3);
    }

    #[test]
    fn test_exhausted_retries() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht11);
        for _ in 0..10 {
            gpio.queue_waveform(PIN, Waveform::dht_frame([0x37, 0x00, 0x18, 0x00, 0x00]));
        }

        let outcome = dht.fetch_or_error();

        assert!(outcome.results().is_empty());
        assert_eq!(outcome.error().map(SensorError::code), Some(ErrorCode::InvalidValue));
        assert_eq!(gpio.input_switches(PIN), 10);
    }

    #[test]
    fn test_retry_delay_only_between_attempts() {
        let (dht, gpio) = sensor(DhtVariant::Dht22);
        let mut dht = dht.with_timing(DhtTiming {
            max_attempts: 2,
            ..DhtTiming::default()
        });
        dht.prepare().unwrap();
        dht.fetch().unwrap_err();

        // Two idle-line timeouts, one retry pause
        let per_attempt = 18_000 + 40 + 254;
        assert_eq!(gpio.now_us(), 2 * per_attempt + 1_000_000);
    }

    #[test]
    fn test_gpio_init_failure() {
        let (mut dht, gpio) = sensor(DhtVariant::Dht22);
        gpio.fail_initialization("Failed to initialize GPIO");

        let outcome = dht.fetch_or_error();

        assert_eq!(outcome.error().map(SensorError::code), Some(ErrorCode::GpioError));
        assert_eq!(gpio.input_switches(PIN), 0);
    }

    /// Line reads that take `read_cost_us` of bus time, like a chardev ioctl
    #[derive(Clone)]
    struct SlowGpio {
        inner: MockGpio,
        read_cost_us: u32,
    }

    impl TimerInterface for SlowGpio {
        fn delay_us(&mut self, us: u32) -> Result<()> {
            self.inner.delay_us(us)
        }

        fn now_us(&self) -> u64 {
            self.inner.now_us()
        }
    }

    impl GpioInterface for SlowGpio {
        fn initialize(&mut self) -> Result<()> {
            self.inner.initialize()
        }

        fn set_mode(&mut self, pin: u8, mode: GpioMode) -> Result<()> {
            self.inner.set_mode(pin, mode)
        }

        fn write(&mut self, pin: u8, level: Level) -> Result<()> {
            self.inner.write(pin, level)
        }

        fn read(&mut self, pin: u8) -> Result<Level> {
            self.inner.delay_us(self.read_cost_us)?;
            self.inner.read(pin)
        }
    }

    #[test]
    fn test_pulse_widths_use_elapsed_time() {
        for read_cost_us in [1, 2, 3] {
            let gpio = MockGpio::new();
            let slow = SlowGpio {
                inner: gpio.clone(),
                read_cost_us,
            };
            let mut dht = Dht::new("slow", PIN, DhtVariant::Dht22, slow).with_timing(DhtTiming {
                max_attempts: 1,
                ..DhtTiming::default()
            });
            gpio.queue_waveform(PIN, Waveform::dht_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]));

            let outcome = dht.fetch_or_error();

            let results = outcome.results();
            assert_eq!(results.len(), 2, "read cost {read_cost_us} us");
            assert_relative_eq!(results[0].value().as_f64(), 65.2);
            assert_relative_eq!(results[1].value().as_f64(), 35.1);
        }
    }

    #[test]
    fn test_truncated_frame_is_discarded() {
        let (dht, gpio) = sensor(DhtVariant::Dht22);
        let mut dht = dht.with_timing(DhtTiming {
            max_attempts: 1,
            ..DhtTiming::default()
        });
        // Stops after the preamble and one bit: the line then idles high
        gpio.queue_waveform(
            PIN,
            Waveform::new()
                .then(Level::High, 20)
                .then(Level::Low, 80)
                .then(Level::High, 80)
                .then(Level::Low, 50)
                .then(Level::High, 26)
                .then(Level::Low, 50),
        );

        assert!(dht.fetch_or_error().has_error());
    }
}
