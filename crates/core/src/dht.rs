//! DHT11/DHT22 frame handling
//!
//! A DHT transmission is 40 bits, most significant bit first. Each bit is
//! a ~50 us low pulse followed by a high pulse whose width encodes the
//! value: roughly 26-28 us for `0` and 70 us for `1`. The five resulting
//! bytes are humidity (2), temperature (2) and a checksum equal to the
//! low byte of the sum of the first four.

use core::fmt;

/// Number of data bits in one transmission
pub const FRAME_BITS: usize = 40;

/// Number of bytes in one transmission, checksum included
pub const FRAME_BYTES: usize = 5;

/// Pulse measurement and retry parameters for a DHT read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhtTiming {
    /// Maximum 1 us polls spent waiting for a line transition
    pub timeout_polls: u32,

    /// High pulses strictly longer than this decode as `1`
    pub high_threshold_us: u32,

    /// Full read attempts before giving up
    pub max_attempts: u32,

    /// Pause between two failed attempts in milliseconds
    pub retry_delay_ms: u32,
}

impl Default for DhtTiming {
    fn default() -> Self {
        Self {
            timeout_polls: 255,
            high_threshold_us: 28,
            max_attempts: 10,
            retry_delay_ms: 1000,
        }
    }
}

/// Sensor family sharing the DHT wire protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtVariant {
    /// Integral humidity and temperature, first and third byte only
    Dht11,
    /// Tenth-resolution humidity and signed temperature
    Dht22,
}

/// Frame-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than 40 bits were captured
    Incomplete { bits: usize },
    /// Checksum byte does not match the data bytes
    Checksum { expected: u8, actual: u8 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete { bits } => {
                write!(f, "incomplete frame: {} of {} bits", bits, FRAME_BITS)
            }
            Self::Checksum { expected, actual } => write!(
                f,
                "checksum mismatch: expected {:#04x}, got {:#04x}",
                expected, actual
            ),
        }
    }
}

/// Accumulates measured high-pulse widths into frame bytes
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    bytes: [u8; FRAME_BYTES],
    bits: usize,
    high_threshold_us: u32,
}

impl FrameAssembler {
    pub fn new(high_threshold_us: u32) -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
            bits: 0,
            high_threshold_us,
        }
    }

    /// Push the width of one high pulse
    ///
    /// Returns `false` once the frame already holds 40 bits; the pulse is
    /// ignored in that case.
    pub fn push_pulse(&mut self, high_us: u32) -> bool {
        if self.bits >= FRAME_BITS {
            return false;
        }
        let byte = self.bits / 8;
        self.bytes[byte] <<= 1;
        if high_us > self.high_threshold_us {
            self.bytes[byte] |= 1;
        }
        self.bits += 1;
        true
    }

    /// Number of bits captured so far
    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn is_complete(&self) -> bool {
        self.bits == FRAME_BITS
    }

    /// Validate the captured bits as a frame
    pub fn finish(self) -> Result<Frame, FrameError> {
        if !self.is_complete() {
            return Err(FrameError::Incomplete { bits: self.bits });
        }
        Frame::from_bytes(self.bytes)
    }
}

/// Checksum-validated DHT frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_BYTES],
}

impl Frame {
    /// Build a frame, rejecting it if the checksum byte is wrong
    pub fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Result<Self, FrameError> {
        let expected = checksum(&bytes);
        if expected != bytes[4] {
            return Err(FrameError::Checksum {
                expected,
                actual: bytes[4],
            });
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.bytes
    }

    /// Interpret the data bytes for the given variant
    pub fn decode(&self, variant: DhtVariant) -> DhtReading {
        let b = &self.bytes;
        match variant {
            DhtVariant::Dht11 => DhtReading::Coarse {
                humidity: b[0],
                temperature: b[2] & 0x7F,
            },
            DhtVariant::Dht22 => {
                let humidity_tenths = u16::from_be_bytes([b[0], b[1]]);
                let magnitude = u16::from_be_bytes([b[2] & 0x7F, b[3]]) as i16;
                let temperature_tenths = if b[2] & 0x80 != 0 {
                    -magnitude
                } else {
                    magnitude
                };
                DhtReading::Fine {
                    humidity_tenths,
                    temperature_tenths,
                }
            }
        }
    }
}

/// Low byte of the sum of the four data bytes
pub fn checksum(bytes: &[u8; FRAME_BYTES]) -> u8 {
    bytes[..4]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Decoded humidity and temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtReading {
    /// DHT11: whole percent and whole degrees Celsius
    Coarse { humidity: u8, temperature: u8 },
    /// DHT22: tenths of a percent and signed tenths of a degree
    Fine {
        humidity_tenths: u16,
        temperature_tenths: i16,
    },
}

impl DhtReading {
    /// Relative humidity in percent
    pub fn humidity(&self) -> f64 {
        match *self {
            Self::Coarse { humidity, .. } => humidity as f64,
            Self::Fine {
                humidity_tenths, ..
            } => humidity_tenths as f64 / 10.0,
        }
    }

    /// Temperature in degrees Celsius
    pub fn temperature(&self) -> f64 {
        match *self {
            Self::Coarse { temperature, .. } => temperature as f64,
            Self::Fine {
                temperature_tenths,
                ..
            } => temperature_tenths as f64 / 10.0,
        }
    }
}
