//! Mock I2C implementation for testing
//!
//! Simulates register-file slaves behind a Linux-style bus handle. A write
//! of `[reg]` moves the slave's register pointer, `[reg, v0, v1, ..]`
//! stores values from `reg` onward, and reads return bytes from the
//! pointer with auto-increment. Command triggers let a test model
//! conversion results that only appear after a control write.

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cInterface, TimerInterface},
    Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Bus activity for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cTransaction {
    Open,
    Close,
    Select { address: u16 },
    /// Write transaction
    Write { address: u16, data: Vec<u8> },
    /// Read transaction
    Read { address: u16, len: usize },
}

#[derive(Debug, Clone)]
struct Slave {
    registers: [u8; 256],
    pointer: u8,
}

impl Default for Slave {
    fn default() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Trigger {
    address: u16,
    register: u8,
    value: u8,
    target: u8,
    payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    clock_us: u64,
    open: bool,
    selected: Option<u16>,
    slaves: HashMap<u16, Slave>,
    triggers: Vec<Trigger>,
    transactions: Vec<I2cTransaction>,
    opens: usize,
    closes: usize,
    open_failure: Option<String>,
    select_failures: HashSet<u16>,
    short_reads: bool,
}

/// Mock I2C implementation
///
/// Clones share the same simulated bus, so a test can keep a handle for
/// inspection while a sensor owns another.
#[derive(Debug, Clone)]
pub struct MockI2c {
    path: String,
    state: Arc<Mutex<State>>,
}

impl Default for MockI2c {
    fn default() -> Self {
        Self::new("/dev/i2c-1")
    }
}

impl MockI2c {
    /// Create a new mock bus with no slaves attached
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a slave with all registers zeroed
    pub fn attach(&self, address: u16) {
        self.state().slaves.entry(address).or_default();
    }

    /// Preload registers of `address` starting at `register`
    ///
    /// Attaches the slave if needed.
    pub fn set_registers(&self, address: u16, register: u8, values: &[u8]) {
        let mut state = self.state();
        let slave = state.slaves.entry(address).or_default();
        for (offset, value) in values.iter().enumerate() {
            slave.registers[register.wrapping_add(offset as u8) as usize] = *value;
        }
    }

    /// Current value of one register
    pub fn register(&self, address: u16, register: u8) -> Option<u8> {
        self.state()
            .slaves
            .get(&address)
            .map(|slave| slave.registers[register as usize])
    }

    /// When `value` is written to `register`, store `payload` at `target`
    pub fn on_write(&self, address: u16, register: u8, value: u8, target: u8, payload: &[u8]) {
        self.state().triggers.push(Trigger {
            address,
            register,
            value,
            target,
            payload: payload.to_vec(),
        });
    }

    /// Make `open` fail with `reason`
    pub fn fail_open(&self, reason: &str) {
        self.state().open_failure = Some(reason.to_string());
    }

    /// Make `select_slave(address)` fail
    pub fn fail_select(&self, address: u16) {
        self.state().select_failures.insert(address);
    }

    /// Make every read return one byte short
    pub fn short_reads(&self, enabled: bool) {
        self.state().short_reads = enabled;
    }

    /// Get transaction log (for test verification)
    pub fn transactions(&self) -> Vec<I2cTransaction> {
        self.state().transactions.clone()
    }

    /// Clear transaction log
    pub fn clear_transactions(&self) {
        self.state().transactions.clear();
    }

    /// Writes addressed to `address`, in order
    pub fn writes_to(&self, address: u16) -> Vec<Vec<u8>> {
        self.state()
            .transactions
            .iter()
            .filter_map(|t| match t {
                I2cTransaction::Write { address: a, data } if *a == address => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.state().opens
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }
}

impl State {
    fn addressed(&self) -> Result<u16> {
        match (self.open, self.selected) {
            (true, Some(address)) => Ok(address),
            _ => Err(I2cError::NotOpen.into()),
        }
    }

    fn slave_mut(&mut self, address: u16) -> Result<&mut Slave> {
        self.slaves.get_mut(&address).ok_or_else(|| {
            PlatformError::I2c(I2cError::Transfer(format!(
                "no acknowledge from {:#04x}",
                address
            )))
        })
    }
}

impl TimerInterface for MockI2c {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        let mut state = self.state();
        state.clock_us = state.clock_us.wrapping_add(us as u64);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.state().clock_us
    }
}

impl I2cInterface for MockI2c {
    fn bus_path(&self) -> &str {
        &self.path
    }

    fn open(&mut self) -> Result<()> {
        let mut state = self.state();
        if let Some(reason) = &state.open_failure {
            return Err(PlatformError::Open {
                path: self.path.clone(),
                reason: reason.clone(),
            });
        }
        state.open = true;
        state.selected = None;
        state.opens += 1;
        state.transactions.push(I2cTransaction::Open);
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state();
        if state.open {
            state.open = false;
            state.selected = None;
            state.closes += 1;
            state.transactions.push(I2cTransaction::Close);
        }
    }

    fn select_slave(&mut self, address: u16) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(I2cError::NotOpen.into());
        }
        if state.select_failures.contains(&address) {
            return Err(I2cError::SlaveSelect {
                address,
                reason: "Device or resource busy".into(),
            }
            .into());
        }
        state.selected = Some(address);
        state.transactions.push(I2cTransaction::Select { address });
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        let address = state.addressed()?;
        state.transactions.push(I2cTransaction::Write {
            address,
            data: data.to_vec(),
        });

        let slave = state.slave_mut(address)?;
        let Some((&register, values)) = data.split_first() else {
            return Ok(());
        };
        slave.pointer = register;
        for (offset, value) in values.iter().enumerate() {
            slave.registers[register.wrapping_add(offset as u8) as usize] = *value;
        }

        let fired: Vec<Trigger> = state
            .triggers
            .iter()
            .filter(|t| {
                t.address == address
                    && values
                        .iter()
                        .enumerate()
                        .any(|(i, v)| register.wrapping_add(i as u8) == t.register && *v == t.value)
            })
            .cloned()
            .collect();
        let slave = state.slave_mut(address)?;
        for trigger in fired {
            for (offset, value) in trigger.payload.iter().enumerate() {
                slave.registers[trigger.target.wrapping_add(offset as u8) as usize] = *value;
            }
        }
        Ok(())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        let mut state = self.state();
        let address = state.addressed()?;
        state.transactions.push(I2cTransaction::Read {
            address,
            len: buffer.len(),
        });
        let short = state.short_reads;

        let slave = state.slave_mut(address)?;
        let available = if short {
            buffer.len().saturating_sub(1)
        } else {
            buffer.len()
        };
        for byte in buffer.iter_mut().take(available) {
            *byte = slave.registers[slave.pointer as usize];
            slave.pointer = slave.pointer.wrapping_add(1);
        }

        if available < buffer.len() {
            return Err(I2cError::ShortRead {
                expected: buffer.len(),
                read: available,
            }
            .into());
        }
        Ok(())
    }
}
