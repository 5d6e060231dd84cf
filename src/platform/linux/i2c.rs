//! `/dev/i2c-N` backend

use super::{delay, monotonic_us};
use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cInterface, TimerInterface},
    Result,
};
use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;

/// I2C access through a Linux i2c-dev node
///
/// The node is opened by `open` and released by `close`; nothing is held
/// between transactions.
pub struct LinuxI2c {
    path: String,
    device: Option<I2cdev>,
    address: Option<u8>,
}

impl LinuxI2c {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            device: None,
            address: None,
        }
    }

    fn addressed(&mut self) -> Result<(&mut I2cdev, u8)> {
        match (self.device.as_mut(), self.address) {
            (Some(device), Some(address)) => Ok((device, address)),
            _ => Err(I2cError::NotOpen.into()),
        }
    }
}

impl Clone for LinuxI2c {
    fn clone(&self) -> Self {
        Self::new(&self.path)
    }
}

impl TimerInterface for LinuxI2c {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        delay(us);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        monotonic_us()
    }
}

impl I2cInterface for LinuxI2c {
    fn bus_path(&self) -> &str {
        &self.path
    }

    fn open(&mut self) -> Result<()> {
        let device = I2cdev::new(&self.path).map_err(|e| PlatformError::Open {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        self.device = Some(device);
        self.address = None;
        Ok(())
    }

    fn close(&mut self) {
        self.address = None;
        self.device = None;
    }

    fn select_slave(&mut self, address: u16) -> Result<()> {
        if self.device.is_none() {
            return Err(I2cError::NotOpen.into());
        }
        let address = u8::try_from(address)
            .ok()
            .filter(|a| *a <= 0x7F)
            .ok_or_else(|| I2cError::SlaveSelect {
                address,
                reason: "not a 7-bit address".into(),
            })?;
        self.address = Some(address);
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let (device, address) = self.addressed()?;
        device
            .write(address, data)
            .map_err(|e| I2cError::Transfer(format!("{:?}", e)).into())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<()> {
        let (device, address) = self.addressed()?;
        device
            .read(address, buffer)
            .map_err(|e| I2cError::Transfer(format!("{:?}", e)).into())
    }
}
