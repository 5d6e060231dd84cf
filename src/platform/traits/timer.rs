//! Timer interface trait
//!
//! Every bus handle doubles as its own clock so protocol code can busy-wait
//! against the same time base the backend uses. Mock backends advance a
//! virtual clock instead of sleeping.

use crate::platform::Result;

/// Delay and monotonic time source
pub trait TimerInterface {
    /// Block for at least `us` microseconds
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Monotonic time in microseconds since an arbitrary epoch
    fn now_us(&self) -> u64;

    /// Monotonic time in milliseconds
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
