use core::fmt;

/// A rejected SPI configuration field, carrying the value that was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Clock polarity must be 0 or 1.
    Polarity(u8),
    /// Clock phase must be 0 or 1.
    Phase(u8),
    /// Word size must be 8 or 9 bits.
    Bits(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Polarity(value) => {
                write!(f, "Invalid polarity: {}", value)
            }
            ConfigError::Phase(value) => write!(f, "Invalid phase: {}", value),
            ConfigError::Bits(value) => {
                write!(f, "Invalid number of bits: {}", value)
            }
        }
    }
}

/// Errors returned by bus operations.
///
/// `E` is the error type of the underlying hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The operation requires the bus lock, which the caller does not hold.
    LockRequired,
    /// Configuration parameters outside their valid sets.
    InvalidConfiguration(ConfigError),
    /// The hardware reported a failure.
    Bus(E),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::InvalidConfiguration(e)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockRequired => write!(f, "Function requires bus lock"),
            Error::InvalidConfiguration(err) => {
                write!(f, "Invalid configuration: {}", err)
            }
            Error::Bus(err) => write!(f, "Bus error: {}", err),
        }
    }
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for Error<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Error::Bus(err) => err.kind(),
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}
