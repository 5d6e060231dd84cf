//! TSL2561 Register Definitions
//!
//! Based on the TAOS TSL2561 datasheet (TAOS059N). Every register access
//! goes through the command byte, see [`Command`].

use bitflags::bitflags;

/// I2C address with ADDR SEL floating (0x29 tied low, 0x49 tied high)
pub const TSL2561_ADDR: u16 = 0x39;

bitflags! {
    /// Command byte preceding every register access
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Command: u8 {
        /// Must be set to select the command register
        const CMD = 0x80;
    }
}

/// Power control
pub const CONTROL: u8 = 0x00;

/// Integration time and gain
pub const TIMING: u8 = 0x01;

/// Interrupt control
pub const INTERRUPT: u8 = 0x06;

/// Channel 0 (visible + IR) low byte
pub const DATA0LOW: u8 = 0x0C;
pub const DATA0HIGH: u8 = 0x0D;

/// Channel 1 (IR only) low byte
pub const DATA1LOW: u8 = 0x0E;
pub const DATA1HIGH: u8 = 0x0F;

/// CONTROL value powering the device up
pub const POWER_ON: u8 = 0x03;

/// INTERRUPT value disabling interrupt output
pub const INTERRUPT_DISABLED: u8 = 0x00;

/// Command byte addressing `register` with a plain byte access
#[inline]
pub const fn command(register: u8) -> u8 {
    Command::CMD.bits() | (register & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(command(CONTROL), 0x80);
        assert_eq!(command(TIMING), 0x81);
        assert_eq!(command(INTERRUPT), 0x86);
        assert_eq!(command(DATA0LOW), 0x8C);
        assert_eq!(command(DATA1HIGH), 0x8F);
    }
}
