#![cfg_attr(not(test), no_std)]
//! Lock-gated access arbitration for shared SPI and I2C buses.
//!
//! Several logical clients may sit on the same clock/data wiring. Each bus
//! object carries an advisory single-owner lock; configuration and transfer
//! operations are refused unless the lock is held, and their parameters are
//! validated (SPI mode and word size) or windowed (I2C buffer slices) before
//! anything reaches the hardware.
//!
//! The hardware itself is supplied by the caller through [`BusFactory`]
//! together with [`SpiHardware`] or [`I2cHardware`] on the created bus.

#[macro_use]
mod fmt;

mod config;
mod error;
mod factory;
mod handle;
pub mod i2c;
mod lock;
mod pins;
pub mod spi;
mod window;

pub use config::{I2cConfig, SpiConfig, SpiSettings, WordSize};
pub use error::{ConfigError, Error};
pub use factory::BusFactory;
pub use handle::BusHandle;
pub use i2c::{I2cBus, I2cHardware};
pub use lock::BusLock;
pub use pins::{I2cPins, SpiPins};
pub use spi::{SpiBus, SpiHardware};
pub use window::{BufferWindow, Window};
