//! Mock GPIO implementation for testing
//!
//! Input pins read a static level unless a [`Waveform`] is queued for them.
//! Each switch of a pin to input mode arms the next queued waveform,
//! measured against a virtual clock that only `delay_us`/`delay_ms`
//! advance. Reads take no virtual time; wrap the mock when a test needs
//! line reads that cost bus time.

use crate::platform::{
    error::{GpioError, PlatformError},
    init::InitGate,
    traits::{GpioInterface, GpioMode, Level, TimerInterface},
    Result,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of lines on the mock chip (BCM2835 layout)
pub const MOCK_PIN_COUNT: u8 = 54;

/// Scripted sequence of line levels
///
/// After the last segment the line idles high, as a pulled-up
/// single-wire bus does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Waveform {
    segments: Vec<(Level, u32)>,
}

impl Waveform {
    /// Empty waveform: the line stays high
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment holding `level` for `duration_us`
    pub fn then(mut self, level: Level, duration_us: u32) -> Self {
        self.segments.push((level, duration_us));
        self
    }

    /// Total scripted duration in microseconds
    pub fn duration_us(&self) -> u64 {
        self.segments.iter().map(|(_, d)| *d as u64).sum()
    }

    /// DHT response to a start signal carrying `bytes`
    ///
    /// Line release (20 us high), 80 us low / 80 us high acknowledge, then
    /// per bit 50 us low followed by 26 us (`0`) or 70 us (`1`) high, and a
    /// final 50 us low.
    pub fn dht_frame(bytes: [u8; 5]) -> Self {
        let mut waveform = Self::new()
            .then(Level::High, 20)
            .then(Level::Low, 80)
            .then(Level::High, 80);
        for byte in bytes {
            for bit in (0..8).rev() {
                let high = if byte & (1 << bit) != 0 { 70 } else { 26 };
                waveform = waveform.then(Level::Low, 50).then(Level::High, high);
            }
        }
        waveform.then(Level::Low, 50)
    }

    fn level_at(&self, elapsed_us: u64) -> Level {
        let mut end = 0u64;
        for (level, duration) in &self.segments {
            end += *duration as u64;
            if elapsed_us < end {
                return *level;
            }
        }
        Level::High
    }
}

/// Recorded pin activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    Mode { pin: u8, mode: GpioMode, at_us: u64 },
    Write { pin: u8, level: Level, at_us: u64 },
}

#[derive(Debug, Default)]
struct State {
    clock_us: u64,
    init_failure: Option<String>,
    init_runs: usize,
    levels: HashMap<u8, Level>,
    modes: HashMap<u8, GpioMode>,
    queued: HashMap<u8, VecDeque<Waveform>>,
    active: HashMap<u8, (Waveform, u64)>,
    input_switches: HashMap<u8, usize>,
    events: Vec<GpioEvent>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    init: InitGate<()>,
}

/// Mock GPIO implementation
///
/// Clones share pins, clock and initialization state, so a test can keep
/// a handle while a sensor owns another.
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    shared: Arc<Shared>,
}

impl MockGpio {
    /// Create a new mock GPIO chip with every input reading high
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the level read from `pin` when no waveform is active
    pub fn set_input_level(&self, pin: u8, level: Level) {
        self.state().levels.insert(pin, level);
    }

    /// Queue a waveform, armed the next time `pin` switches to input
    pub fn queue_waveform(&self, pin: u8, waveform: Waveform) {
        self.state()
            .queued
            .entry(pin)
            .or_default()
            .push_back(waveform);
    }

    /// Make initialization fail with `reason` until cleared
    pub fn fail_initialization(&self, reason: &str) {
        self.state().init_failure = Some(reason.to_string());
    }

    pub fn clear_initialization_failure(&self) {
        self.state().init_failure = None;
    }

    /// Number of times the one-time initializer actually ran
    pub fn init_runs(&self) -> usize {
        self.state().init_runs
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.init.is_initialized()
    }

    /// Number of switches of `pin` into input mode
    pub fn input_switches(&self, pin: u8) -> usize {
        self.state().input_switches.get(&pin).copied().unwrap_or(0)
    }

    /// Waveforms still queued for `pin`
    pub fn queued_waveforms(&self, pin: u8) -> usize {
        self.state().queued.get(&pin).map_or(0, VecDeque::len)
    }

    pub fn mode(&self, pin: u8) -> Option<GpioMode> {
        self.state().modes.get(&pin).copied()
    }

    /// Get event log (for test verification)
    pub fn events(&self) -> Vec<GpioEvent> {
        self.state().events.clone()
    }

    fn check_ready(&self, pin: u8) -> Result<()> {
        if !self.shared.init.is_initialized() {
            return Err(GpioError::Init("GPIO accessed before initialization".into()).into());
        }
        if pin >= MOCK_PIN_COUNT {
            return Err(GpioError::InvalidPin(pin).into());
        }
        Ok(())
    }
}

impl TimerInterface for MockGpio {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        let mut state = self.state();
        state.clock_us = state.clock_us.wrapping_add(us as u64);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.state().clock_us
    }
}

impl GpioInterface for MockGpio {
    fn initialize(&mut self) -> Result<()> {
        let shared = &self.shared;
        shared.init.get_or_try_init(|| {
            let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.init_runs += 1;
            match &state.init_failure {
                Some(reason) => Err(PlatformError::Gpio(GpioError::Init(reason.clone()))),
                None => Ok(()),
            }
        })?;
        Ok(())
    }

    fn set_mode(&mut self, pin: u8, mode: GpioMode) -> Result<()> {
        self.check_ready(pin)?;
        let mut state = self.state();
        let at_us = state.clock_us;
        state.modes.insert(pin, mode);
        state.events.push(GpioEvent::Mode { pin, mode, at_us });

        state.active.remove(&pin);
        if mode == GpioMode::Input {
            *state.input_switches.entry(pin).or_default() += 1;
            let next = state.queued.get_mut(&pin).and_then(VecDeque::pop_front);
            if let Some(waveform) = next {
                state.active.insert(pin, (waveform, at_us));
            }
        }
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<()> {
        self.check_ready(pin)?;
        let mut state = self.state();
        if state.modes.get(&pin) != Some(&GpioMode::Output) {
            return Err(GpioError::InvalidMode { pin }.into());
        }
        let at_us = state.clock_us;
        state.events.push(GpioEvent::Write { pin, level, at_us });
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level> {
        self.check_ready(pin)?;
        let state = self.state();
        if !state.modes.contains_key(&pin) {
            return Err(GpioError::InvalidMode { pin }.into());
        }
        if let Some((waveform, armed_at)) = state.active.get(&pin) {
            return Ok(waveform.level_at(state.clock_us - armed_at));
        }
        Ok(state.levels.get(&pin).copied().unwrap_or(Level::High))
    }
}
