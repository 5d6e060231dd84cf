//! Character-device GPIO backend

use super::{delay, monotonic_us};
use crate::platform::{
    error::{GpioError, PlatformError},
    init::InitGate,
    traits::{GpioInterface, GpioMode, Level, TimerInterface},
    Result,
};
use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "raspi_sensors";

/// Process-wide chip handle, opened by the first `initialize`
static CHIP: InitGate<Mutex<Chip>> = InitGate::new();

/// GPIO access through `/dev/gpiochipN`
///
/// The chip is opened once per process; the first path passed to
/// `initialize` wins. Each instance holds its own line requests.
pub struct LinuxGpio {
    chip_path: String,
    lines: HashMap<u8, (GpioMode, LineHandle)>,
}

impl LinuxGpio {
    pub fn new(chip_path: &str) -> Self {
        Self {
            chip_path: chip_path.to_string(),
            lines: HashMap::new(),
        }
    }

    fn line(&self, pin: u8) -> Result<&(GpioMode, LineHandle)> {
        self.lines
            .get(&pin)
            .ok_or(PlatformError::Gpio(GpioError::InvalidMode { pin }))
    }
}

impl Clone for LinuxGpio {
    /// Line requests are exclusive, so a clone starts without any
    fn clone(&self) -> Self {
        Self::new(&self.chip_path)
    }
}

impl TimerInterface for LinuxGpio {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        delay(us);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        monotonic_us()
    }
}

impl GpioInterface for LinuxGpio {
    fn initialize(&mut self) -> Result<()> {
        let path = &self.chip_path;
        CHIP.get_or_try_init(|| {
            crate::log_info!("Opening GPIO chip {}", path);
            Chip::new(path)
                .map(Mutex::new)
                .map_err(|e| PlatformError::Gpio(GpioError::Init(format!("{}: {}", path, e))))
        })?;
        Ok(())
    }

    fn set_mode(&mut self, pin: u8, mode: GpioMode) -> Result<()> {
        let chip = CHIP
            .get()
            .ok_or_else(|| GpioError::Init("GPIO accessed before initialization".into()))?;

        // Release the previous request before asking for the new direction
        self.lines.remove(&pin);

        let line_error = |e: gpio_cdev::Error| GpioError::Line {
            pin,
            reason: e.to_string(),
        };
        let mut chip = chip.lock().unwrap_or_else(PoisonError::into_inner);
        let line = chip.get_line(pin as u32).map_err(|_| GpioError::InvalidPin(pin))?;
        let handle = match mode {
            GpioMode::Input => line.request(LineRequestFlags::INPUT, 0, CONSUMER),
            GpioMode::Output => line.request(LineRequestFlags::OUTPUT, 1, CONSUMER),
        }
        .map_err(line_error)?;

        self.lines.insert(pin, (mode, handle));
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<()> {
        let (mode, handle) = self.line(pin)?;
        if *mode != GpioMode::Output {
            return Err(GpioError::InvalidMode { pin }.into());
        }
        handle
            .set_value(level.is_high() as u8)
            .map_err(|e| {
                GpioError::Line {
                    pin,
                    reason: e.to_string(),
                }
                .into()
            })
    }

    fn read(&mut self, pin: u8) -> Result<Level> {
        let (_, handle) = self.line(pin)?;
        let value = handle.get_value().map_err(|e| GpioError::Line {
            pin,
            reason: e.to_string(),
        })?;
        Ok(Level::from(value != 0))
    }
}
