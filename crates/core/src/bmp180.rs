//! BMP180 calibration and compensation
//!
//! Implements the fixed-point temperature and pressure compensation from
//! the Bosch BMP180 datasheet. Temperature must be compensated first on
//! every cycle: the pressure formula consumes the `B5` term produced by
//! the temperature stage, which [`TrueTemperature`] carries forward.

use core::fmt;

/// Number of 16-bit calibration words stored in the EEPROM
pub const CALIBRATION_WORDS: usize = 11;

/// Size of the calibration EEPROM in bytes
pub const CALIBRATION_BYTES: usize = CALIBRATION_WORDS * 2;

/// Control value starting a temperature conversion
pub const TEMPERATURE_COMMAND: u8 = 0x2E;

/// Temperature conversion time in microseconds
pub const TEMPERATURE_WAIT_US: u32 = 4500;

/// Compensation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompensationError {
    /// A calibration word reads as 0x0000 or 0xFFFF (erased or bus fault)
    InvalidCalibration { index: usize, raw: u16 },
    /// Raw readings lead to a zero divisor in the fixed-point formula
    DivisionByZero,
}

impl fmt::Display for CompensationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCalibration { index, raw } => {
                write!(f, "calibration word {} is invalid ({:#06x})", index, raw)
            }
            Self::DivisionByZero => write!(f, "compensation divisor is zero"),
        }
    }
}

/// Pressure oversampling setting (`oss`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oversampling {
    #[default]
    UltraLowPower = 0,
    Standard = 1,
    HighResolution = 2,
    UltraHighResolution = 3,
}

impl Oversampling {
    pub fn from_bits(oss: u8) -> Option<Self> {
        match oss {
            0 => Some(Self::UltraLowPower),
            1 => Some(Self::Standard),
            2 => Some(Self::HighResolution),
            3 => Some(Self::UltraHighResolution),
            _ => None,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Control value starting a pressure conversion at this setting
    #[inline]
    pub const fn pressure_command(self) -> u8 {
        0x34 + (self.bits() << 6)
    }

    /// Conversion time in microseconds: 2 ms + 3 ms per sample
    #[inline]
    pub const fn pressure_wait_us(self) -> u32 {
        (2 + (3 << self.bits())) * 1000
    }
}

/// Factory calibration coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

/// Compensated temperature plus the intermediate needed for pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrueTemperature {
    /// Temperature in 0.1 degC
    pub deci_celsius: i32,
    b5: i32,
}

impl TrueTemperature {
    /// Temperature in degrees Celsius
    pub fn celsius(&self) -> f64 {
        self.deci_celsius as f64 / 10.0
    }

    pub fn b5(&self) -> i32 {
        self.b5
    }
}

impl Calibration {
    /// Build from the eleven words in EEPROM order (0xAA..0xBF)
    pub fn from_words(words: [u16; CALIBRATION_WORDS]) -> Result<Self, CompensationError> {
        if let Some((index, raw)) = words
            .iter()
            .enumerate()
            .find(|(_, w)| **w == 0x0000 || **w == 0xFFFF)
        {
            return Err(CompensationError::InvalidCalibration { index, raw: *raw });
        }

        Ok(Self {
            ac1: words[0] as i16,
            ac2: words[1] as i16,
            ac3: words[2] as i16,
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: words[6] as i16,
            b2: words[7] as i16,
            mb: words[8] as i16,
            mc: words[9] as i16,
            md: words[10] as i16,
        })
    }

    /// Build from the raw big-endian EEPROM block
    pub fn from_bytes(bytes: &[u8; CALIBRATION_BYTES]) -> Result<Self, CompensationError> {
        let mut words = [0u16; CALIBRATION_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Self::from_words(words)
    }

    /// Compensate a raw temperature reading (`UT`)
    pub fn temperature(&self, ut: i32) -> Result<TrueTemperature, CompensationError> {
        let x1 = ut.wrapping_sub(self.ac6 as i32).wrapping_mul(self.ac5 as i32) >> 15;
        let divisor = x1.wrapping_add(self.md as i32);
        if divisor == 0 {
            return Err(CompensationError::DivisionByZero);
        }
        let x2 = ((self.mc as i32) << 11) / divisor;
        let b5 = x1.wrapping_add(x2);

        Ok(TrueTemperature {
            deci_celsius: b5.wrapping_add(8) >> 4,
            b5,
        })
    }

    /// Compensate a raw pressure reading (`UP`) into pascal
    ///
    /// `temperature` must come from the conversion taken immediately
    /// before `up`.
    pub fn pressure(
        &self,
        up: i32,
        temperature: &TrueTemperature,
        oss: Oversampling,
    ) -> Result<i32, CompensationError> {
        let oss = oss.bits() as u32;

        let b6 = temperature.b5.wrapping_sub(4000);
        let b6_sq = b6.wrapping_mul(b6) >> 12;
        let x1 = (self.b2 as i32).wrapping_mul(b6_sq) >> 11;
        let x2 = (self.ac2 as i32).wrapping_mul(b6) >> 11;
        let x3 = x1.wrapping_add(x2);
        let b3 = (((self.ac1 as i32 * 4).wrapping_add(x3) << oss).wrapping_add(2)) >> 2;

        let x1 = (self.ac3 as i32).wrapping_mul(b6) >> 13;
        let x2 = (self.b1 as i32).wrapping_mul(b6_sq) >> 16;
        let x3 = x1.wrapping_add(x2).wrapping_add(2) >> 2;
        let b4 = (self.ac4 as u32).wrapping_mul(x3.wrapping_add(32768) as u32) >> 15;
        if b4 == 0 {
            return Err(CompensationError::DivisionByZero);
        }

        let b7 = (up as u32)
            .wrapping_sub(b3 as u32)
            .wrapping_mul(50000 >> oss);
        let mut p = if b7 < 0x8000_0000 {
            (b7.wrapping_mul(2) / b4) as i32
        } else {
            ((b7 / b4).wrapping_mul(2)) as i32
        };

        let x1 = (p >> 8).wrapping_mul(p >> 8);
        let x1 = x1.wrapping_mul(3038) >> 16;
        let x2 = (-7357i32).wrapping_mul(p) >> 16;
        p = p.wrapping_add(x1.wrapping_add(x2).wrapping_add(3791) >> 4);

        Ok(p)
    }
}

/// Assemble the 19-bit raw pressure from its three register bytes
pub fn uncompensated_pressure(msb: u8, lsb: u8, xlsb: u8, oss: Oversampling) -> i32 {
    (((msb as i32) << 16) + ((lsb as i32) << 8) + xlsb as i32) >> (8 - oss.bits() as i32)
}

/// Assemble the raw temperature from its two register bytes
pub fn uncompensated_temperature(msb: u8, lsb: u8) -> i32 {
    ((msb as i32) << 8) + lsb as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasheet() -> Calibration {
        Calibration {
            ac1: 408,
            ac2: -72,
            ac3: -14383,
            ac4: 32741,
            ac5: 32757,
            ac6: 23153,
            b1: 6190,
            b2: 4,
            mb: -32768,
            mc: -8711,
            md: 2868,
        }
    }

    #[test]
    fn test_datasheet_temperature() {
        let t = datasheet().temperature(27898).unwrap();

        assert_eq!(t.b5(), 2400);
        assert_eq!(t.deci_celsius, 150);
        assert_eq!(t.celsius(), 15.0);
    }

    #[test]
    fn test_datasheet_pressure() {
        let cal = datasheet();
        let t = cal.temperature(27898).unwrap();
        let p = cal.pressure(23843, &t, Oversampling::UltraLowPower).unwrap();

        assert_eq!(p, 69964);
    }

    #[test]
    fn test_every_raw_reading_compensates_without_overflow() {
        let cal = datasheet();
        let oversampling = [
            Oversampling::UltraLowPower,
            Oversampling::Standard,
            Oversampling::HighResolution,
            Oversampling::UltraHighResolution,
        ];
        let mut compensated = 0u32;

        for ut in 0..=u16::MAX as i32 {
            let Ok(t) = cal.temperature(ut) else {
                continue;
            };
            for oss in oversampling {
                let max_up = (1 << (16 + oss.bits() as i32)) - 1;
                for up in [0, 23843, max_up] {
                    if cal.pressure(up, &t, oss).is_ok() {
                        compensated += 1;
                    }
                }
            }
        }

        // UT = 20170 drives B5 to 153510, far outside the datasheet range
        let hot = cal.temperature(20170).unwrap();
        assert_eq!(hot.b5(), 153510);
        assert!(cal.pressure(23843, &hot, Oversampling::UltraLowPower).is_ok());
        assert!(compensated > 0);
    }

    #[test]
    fn test_from_bytes_big_endian() {
        let words: [u16; CALIBRATION_WORDS] = [
            408, -72i16 as u16, -14383i16 as u16, 32741, 32757, 23153, 6190, 4,
            -32768i16 as u16, -8711i16 as u16, 2868,
        ];
        let mut bytes = [0u8; CALIBRATION_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        assert_eq!(Calibration::from_bytes(&bytes).unwrap(), datasheet());
    }

    #[test]
    fn test_rejects_erased_calibration() {
        let mut words = [0x1234u16; CALIBRATION_WORDS];
        words[3] = 0xFFFF;

        assert_eq!(
            Calibration::from_words(words).unwrap_err(),
            CompensationError::InvalidCalibration {
                index: 3,
                raw: 0xFFFF
            }
        );

        words[3] = 0x1234;
        words[10] = 0x0000;
        assert!(Calibration::from_words(words).is_err());
    }

    #[test]
    fn test_temperature_zero_divisor() {
        let mut cal = datasheet();
        // x1 == 0 when UT == AC6
        cal.md = 0;

        assert_eq!(
            cal.temperature(cal.ac6 as i32).unwrap_err(),
            CompensationError::DivisionByZero
        );
    }

    #[test]
    fn test_oversampling_commands() {
        assert_eq!(Oversampling::UltraLowPower.pressure_command(), 0x34);
        assert_eq!(Oversampling::Standard.pressure_command(), 0x74);
        assert_eq!(Oversampling::HighResolution.pressure_command(), 0xB4);
        assert_eq!(Oversampling::UltraHighResolution.pressure_command(), 0xF4);

        assert_eq!(Oversampling::UltraLowPower.pressure_wait_us(), 5000);
        assert_eq!(Oversampling::UltraHighResolution.pressure_wait_us(), 26000);
        assert_eq!(Oversampling::from_bits(4), None);
    }

    #[test]
    fn test_uncompensated_pressure_shift() {
        // 0x5D23 << 8 >> 8 for oss = 0
        assert_eq!(
            uncompensated_pressure(0x5D, 0x23, 0x00, Oversampling::UltraLowPower),
            23843
        );
        assert_eq!(
            uncompensated_pressure(0x5D, 0x23, 0x80, Oversampling::UltraHighResolution),
            (0x5D2380 >> 5)
        );
        assert_eq!(uncompensated_temperature(0x6C, 0xFA), 27898);
    }
}
