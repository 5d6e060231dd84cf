//! Linux bus backends
//!
//! GPIO goes through the character-device interface (`/dev/gpiochipN`)
//! and I2C through `/dev/i2c-N` via `linux-embedded-hal`. Both share a
//! process-wide monotonic clock.

#![cfg(feature = "linux")]

mod gpio;
mod i2c;

pub use gpio::LinuxGpio;
pub use i2c::LinuxI2c;

use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

/// Waits shorter than this spin instead of sleeping
const SPIN_THRESHOLD_US: u32 = 2000;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

pub(crate) fn monotonic_us() -> u64 {
    EPOCH.elapsed().as_micros() as u64
}

/// Block for `us` microseconds
///
/// Bit-banged protocols need microsecond resolution, which the scheduler
/// tick cannot give, so short waits spin on the clock.
pub(crate) fn delay(us: u32) {
    if us >= SPIN_THRESHOLD_US {
        std::thread::sleep(Duration::from_micros(us as u64));
        return;
    }
    let start = Instant::now();
    let target = Duration::from_micros(us as u64);
    while start.elapsed() < target {
        std::hint::spin_loop();
    }
}
