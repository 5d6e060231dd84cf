//! Register access over I2C
//!
//! [`RegisterDevice`] runs every register operation as one complete
//! transaction: open the bus node, select the slave, transfer, close. The
//! bus is never held open between operations and is closed on every path,
//! including errors.

use crate::platform::{traits::I2cInterface, Result};
use core::ops::{Deref, DerefMut};

/// Closes the bus when dropped
struct OpenBus<'a, I: I2cInterface> {
    bus: &'a mut I,
}

impl<I: I2cInterface> Deref for OpenBus<'_, I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.bus
    }
}

impl<I: I2cInterface> DerefMut for OpenBus<'_, I> {
    fn deref_mut(&mut self) -> &mut I {
        self.bus
    }
}

impl<I: I2cInterface> Drop for OpenBus<'_, I> {
    fn drop(&mut self) {
        self.bus.close();
    }
}

/// Register-addressed I2C slave
pub struct RegisterDevice<I: I2cInterface> {
    bus: I,
    address: u16,
}

impl<I: I2cInterface> RegisterDevice<I> {
    pub fn new(bus: I, address: u16) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn bus(&self) -> &I {
        &self.bus
    }

    fn transaction<T>(&mut self, f: impl FnOnce(&mut I) -> Result<T>) -> Result<T> {
        self.bus.open()?;
        let mut open = OpenBus { bus: &mut self.bus };
        open.select_slave(self.address)?;
        f(&mut *open)
    }

    /// Write one register
    pub fn write_u8(&mut self, register: u8, value: u8) -> Result<()> {
        self.transaction(|bus| bus.write_bytes(&[register, value]))
    }

    /// Read consecutive registers starting at `register`
    pub fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.transaction(|bus| {
            bus.write_bytes(&[register])?;
            bus.read_bytes(buffer)
        })
    }

    /// Read one register
    pub fn read_u8(&mut self, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_block(register, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian 16-bit value from `register` and `register + 1`
    pub fn read_u16_be(&mut self, register: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_block(register, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Wait using the bus clock
    pub fn delay_us(&mut self, us: u32) -> Result<()> {
        self.bus.delay_us(us)
    }
}
