//! Bus configuration types.

use embedded_hal::spi::{Mode, Phase, Polarity};

use crate::error::ConfigError;

/// SPI configuration as requested by a client.
///
/// Fields hold raw values; [`SpiConfig::validate`] checks them against the
/// enumerated sets the hardware supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiConfig {
    /// Clock rate in Hz.
    pub baudrate: u32,
    /// Clock idle level (CPOL): 0 or 1.
    pub polarity: u8,
    /// Sampling edge (CPHA): 0 or 1.
    pub phase: u8,
    /// Bits per word: 8 or 9.
    pub bits: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self { baudrate: 100_000, polarity: 0, phase: 0, bits: 8 }
    }
}

impl SpiConfig {
    pub const fn new(baudrate: u32, polarity: u8, phase: u8, bits: u8) -> Self {
        Self { baudrate, polarity, phase, bits }
    }

    /// Check every field and convert into settings the hardware can apply.
    ///
    /// Fields are checked in the order polarity, phase, bits; the first
    /// offending one is reported.
    pub fn validate(&self) -> Result<SpiSettings, ConfigError> {
        let polarity = match self.polarity {
            0 => Polarity::IdleLow,
            1 => Polarity::IdleHigh,
            other => return Err(ConfigError::Polarity(other)),
        };
        let phase = match self.phase {
            0 => Phase::CaptureOnFirstTransition,
            1 => Phase::CaptureOnSecondTransition,
            other => return Err(ConfigError::Phase(other)),
        };
        let word_size = WordSize::try_from(self.bits)?;

        Ok(SpiSettings {
            baudrate: self.baudrate,
            mode: Mode { polarity, phase },
            word_size,
        })
    }
}

/// Supported SPI word sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordSize {
    Eight,
    Nine,
}

impl WordSize {
    pub const fn bits(self) -> u8 {
        match self {
            WordSize::Eight => 8,
            WordSize::Nine => 9,
        }
    }
}

impl TryFrom<u8> for WordSize {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(WordSize::Eight),
            9 => Ok(WordSize::Nine),
            _ => Err(ConfigError::Bits(value)),
        }
    }
}

/// Validated SPI parameters handed to
/// [`SpiHardware::configure`](crate::SpiHardware::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiSettings {
    /// Clock rate in Hz.
    pub baudrate: u32,
    pub mode: Mode,
    pub word_size: WordSize,
}

impl SpiSettings {
    /// Clock polarity as the raw CPOL bit.
    pub fn polarity(&self) -> u8 {
        match self.mode.polarity {
            Polarity::IdleLow => 0,
            Polarity::IdleHigh => 1,
        }
    }

    /// Clock phase as the raw CPHA bit.
    pub fn phase(&self) -> u8 {
        match self.mode.phase {
            Phase::CaptureOnFirstTransition => 0,
            Phase::CaptureOnSecondTransition => 1,
        }
    }
}

/// I2C configuration, fixed when the bus is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self { frequency: 1_000_000 };
}
