//! Lock-gated SPI bus (clock, MOSI, MISO).
//!
//! Chip-select lines are left to the client: several devices can share the
//! clock and data lines, and therefore one [`SpiBus`].

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{SpiConfig, SpiSettings};
use crate::error::Error;
use crate::factory::BusFactory;
use crate::handle::BusHandle;
use crate::pins::SpiPins;

/// Byte clocked out on MOSI while reading.
pub const READ_FILL: u8 = 0x00;

/// Transfer primitives of an SPI peripheral.
pub trait SpiHardware {
    /// Error type for SPI operations
    type Error;

    /// Apply validated clock rate, mode and word size.
    fn configure(&mut self, settings: &SpiSettings) -> Result<(), Self::Error>;

    /// Write all of `data`.
    ///
    /// What happens on MISO meanwhile is up to the implementation.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` while clocking `fill` out on MOSI.
    fn read(&mut self, buf: &mut [u8], fill: u8) -> Result<(), Self::Error>;
}

/// Result of an SPI operation on the bus built by `F`.
pub type SpiResult<T, F> =
    Result<T, Error<<<F as BusFactory>::Bus as SpiHardware>::Error>>;

/// SPI bus guarded by an advisory lock.
///
/// Configuration and transfers require the caller to hold the lock
/// ([`try_lock`](Self::try_lock)); otherwise they fail with
/// [`Error::LockRequired`] without touching the hardware.
pub struct SpiBus<M: RawMutex, F: BusFactory> {
    handle: BusHandle<M, F>,
    settings: Mutex<M, Cell<Option<SpiSettings>>>,
}

impl<M, F> SpiBus<M, F>
where
    M: RawMutex,
    F: BusFactory<Config = ()>,
    F::Bus: SpiHardware,
{
    /// Bring up the SPI hardware from `resources`. The bus starts unlocked
    /// and unconfigured.
    pub fn new(
        resources: F::Resources,
    ) -> Result<Self, (F::Error, F::Resources)> {
        Ok(Self {
            handle: BusHandle::new(resources, &())?,
            settings: Mutex::new(Cell::new(None)),
        })
    }

    /// Construct from individual pins. `clock` is required; either data
    /// line may be omitted.
    pub fn construct<P>(
        clock: P,
        mosi: Option<P>,
        miso: Option<P>,
    ) -> Result<Self, (F::Error, SpiPins<P>)>
    where
        F: BusFactory<Resources = SpiPins<P>>,
    {
        Self::new(SpiPins::new(clock, mosi, miso))
    }

    /// Attempt to grab the SPI lock. Returns `true` on success.
    pub fn try_lock(&self) -> bool {
        self.handle.try_lock()
    }

    pub fn has_lock(&self) -> bool {
        self.handle.has_lock()
    }

    /// Release the SPI lock, whoever holds it.
    pub fn unlock(&self) {
        self.handle.unlock()
    }

    /// Settings applied by the last successful [`configure`](Self::configure).
    pub fn settings(&self) -> Option<SpiSettings> {
        self.settings.lock(Cell::get)
    }

    /// Configure the bus. Only valid when locked.
    ///
    /// Polarity and phase must be 0 or 1 and the word size 8 or 9 bits;
    /// anything else is rejected before the hardware is involved.
    pub fn configure(&self, config: SpiConfig) -> SpiResult<(), F> {
        self.handle.require_lock::<<F::Bus as SpiHardware>::Error>()?;
        let settings = config.validate()?;

        self.handle.with_bus(|bus| {
            bus.configure(&settings).map_err(|e| {
                warn!("spi configure failed");
                Error::Bus(e)
            })
        })?;

        self.settings.lock(|cell| cell.set(Some(settings)));
        debug!(
            "spi configured: {} Hz, polarity {}, phase {}, {} bits",
            settings.baudrate,
            settings.polarity(),
            settings.phase(),
            settings.word_size.bits(),
        );
        Ok(())
    }

    /// Write all of `data`. Only valid when locked.
    pub fn write(&self, data: &[u8]) -> SpiResult<(), F> {
        self.handle.with_bus(|bus| {
            bus.write(data).map_err(|e| {
                warn!("spi write of {} bytes failed", data.len());
                Error::Bus(e)
            })
        })
    }

    /// Fill `buf` while writing zeroes. Only valid when locked.
    pub fn read(&self, buf: &mut [u8]) -> SpiResult<(), F> {
        self.handle.with_bus(|bus| {
            let len = buf.len();
            bus.read(buf, READ_FILL).map_err(|e| {
                warn!("spi read of {} bytes failed", len);
                Error::Bus(e)
            })
        })
    }

    /// Whether the hardware is still up.
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Turn off the SPI bus and clear the lock.
    ///
    /// Returns the pins on the first call; further calls do nothing.
    pub fn deinit(&self) -> Option<F::Resources> {
        let resources = self.handle.deinit();
        self.settings.lock(|cell| cell.set(None));
        resources
    }

    /// Run `f` with the bus and deinitialize it afterwards.
    ///
    /// The bus is released on every exit path: normal return, an error
    /// value returned by `f`, or a panic unwinding through it.
    pub fn scope<R>(self, f: impl FnOnce(&Self) -> R) -> R {
        f(&self)
    }
}
