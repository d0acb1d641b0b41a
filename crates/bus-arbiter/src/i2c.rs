//! Lock-gated I2C bus (SCL, SDA).

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::i2c::{ErrorType, I2c, Operation};
use heapless::Vec;

use crate::config::I2cConfig;
use crate::error::Error;
use crate::factory::BusFactory;
use crate::handle::BusHandle;
use crate::pins::I2cPins;
use crate::window::{BufferWindow, Window};

/// Lowest 7-bit address probed by [`I2cBus::scan`]; `0b0000xxx` is reserved.
pub const FIRST_ADDRESS: u8 = 0x08;
/// Highest 7-bit address probed by [`I2cBus::scan`]; `0b1111xxx` is reserved.
pub const LAST_ADDRESS: u8 = 0x77;
/// Number of addresses a scan probes.
pub const SCAN_CAPACITY: usize = (LAST_ADDRESS - FIRST_ADDRESS) as usize + 1;

/// Addresses that acknowledged a scan, in ascending order.
pub type ScanResult = Vec<u8, SCAN_CAPACITY>;

/// Transfer primitives of an I2C controller.
pub trait I2cHardware {
    /// Error type for I2C operations
    type Error;

    /// Issue a minimal transaction to `address` and report whether a device
    /// acknowledged it.
    fn probe(&mut self, address: u8) -> bool;

    /// Read `buf.len()` bytes from the device at `address`.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` to the device at `address`.
    ///
    /// With `stop` false no stop condition is issued, so the next operation
    /// continues the same transaction with a repeated start.
    fn write(
        &mut self,
        address: u8,
        data: &[u8],
        stop: bool,
    ) -> Result<(), Self::Error>;

    /// Run `operations` against `address` as a single transaction.
    ///
    /// Framing follows [`embedded_hal::i2c::I2c::transaction`]: one start
    /// and address phase, adjacent operations of the same kind joined with
    /// no repeated start between them, and one stop at the end.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error>;
}

/// Result of an I2C operation on the bus built by `F`.
pub type I2cResult<T, F> =
    Result<T, Error<<<F as BusFactory>::Bus as I2cHardware>::Error>>;

/// I2C bus guarded by an advisory lock.
///
/// The clock frequency is fixed at construction. Scans and transfers
/// require the caller to hold the lock ([`try_lock`](Self::try_lock)).
pub struct I2cBus<M: RawMutex, F: BusFactory> {
    handle: BusHandle<M, F>,
    frequency: u32,
}

impl<M, F> I2cBus<M, F>
where
    M: RawMutex,
    F: BusFactory<Config = I2cConfig>,
    F::Bus: I2cHardware,
{
    /// Bring up the I2C hardware from `resources` at `config.frequency`.
    pub fn new(
        resources: F::Resources,
        config: I2cConfig,
    ) -> Result<Self, (F::Error, F::Resources)> {
        let handle = BusHandle::new(resources, &config)?;
        debug!("i2c bus up at {} Hz", config.frequency);
        Ok(Self { handle, frequency: config.frequency })
    }

    /// Construct from the clock and data pins.
    pub fn construct<P>(
        scl: P,
        sda: P,
        config: I2cConfig,
    ) -> Result<Self, (F::Error, I2cPins<P>)>
    where
        F: BusFactory<Resources = I2cPins<P>>,
    {
        Self::new(I2cPins::new(scl, sda), config)
    }

    /// Clock frequency in Hz chosen at construction.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Attempt to grab the I2C lock. Returns `true` on success.
    pub fn try_lock(&self) -> bool {
        self.handle.try_lock()
    }

    pub fn has_lock(&self) -> bool {
        self.handle.has_lock()
    }

    /// Release the I2C lock, whoever holds it.
    pub fn unlock(&self) {
        self.handle.unlock()
    }

    /// Probe every address from `0x08` to `0x77` inclusive and return those
    /// that respond. Only valid when locked.
    ///
    /// Each address is probed exactly once, in ascending order.
    pub fn scan(&self) -> I2cResult<ScanResult, F> {
        self.handle.with_bus(|bus| {
            let mut found = ScanResult::new();
            for address in FIRST_ADDRESS..=LAST_ADDRESS {
                if bus.probe(address) {
                    // Capacity covers every probed address.
                    let _ = found.push(address);
                }
            }
            debug!("i2c scan: {} device(s)", found.len());
            Ok(found)
        })
    }

    /// Read from the device at `address` into the `window` of `buf`.
    /// Only valid when locked.
    ///
    /// The window behaves like `buf[start:end]` without copying; see
    /// [`BufferWindow::compute`] for out-of-range inputs, which shrink the
    /// transfer instead of failing.
    pub fn read_from_into(
        &self,
        address: u8,
        buf: &mut [u8],
        window: Window,
    ) -> I2cResult<(), F> {
        self.handle.with_bus(|bus| {
            let target =
                BufferWindow::compute(buf.len(), window).apply_mut(buf);
            trace!("i2c read {} bytes from {=u8:#x}", target.len(), address);
            bus.read(address, target).map_err(|e| {
                warn!("i2c read from {=u8:#x} failed", address);
                Error::Bus(e)
            })
        })
    }

    /// Write the `window` of `buf` to the device at `address`, issuing a
    /// stop condition afterwards if `stop` is set. Only valid when locked.
    pub fn write_to(
        &self,
        address: u8,
        buf: &[u8],
        window: Window,
        stop: bool,
    ) -> I2cResult<(), F> {
        self.handle.with_bus(|bus| {
            let data = BufferWindow::compute(buf.len(), window).apply(buf);
            trace!("i2c write {} bytes to {=u8:#x}", data.len(), address);
            bus.write(address, data, stop).map_err(|e| {
                warn!("i2c write to {=u8:#x} failed", address);
                Error::Bus(e)
            })
        })
    }

    /// Whether the hardware is still up.
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Release the I2C hardware and clear the lock.
    ///
    /// Returns the pins on the first call; further calls do nothing.
    pub fn deinit(&self) -> Option<F::Resources> {
        self.handle.deinit()
    }

    /// Run `f` with the bus and deinitialize it afterwards, on every exit
    /// path.
    pub fn scope<R>(self, f: impl FnOnce(&Self) -> R) -> R {
        f(&self)
    }
}

impl<M, F> ErrorType for I2cBus<M, F>
where
    M: RawMutex,
    F: BusFactory<Config = I2cConfig>,
    F::Bus: I2cHardware,
    <F::Bus as I2cHardware>::Error: embedded_hal::i2c::Error,
{
    type Error = Error<<F::Bus as I2cHardware>::Error>;
}

/// Lets `embedded-hal` device drivers run on the arbitrated bus.
///
/// Every transaction still requires the bus lock. The operations reach the
/// hardware as one [`I2cHardware::transaction`], so their framing is the
/// controller's.
impl<M, F> I2c for I2cBus<M, F>
where
    M: RawMutex,
    F: BusFactory<Config = I2cConfig>,
    F::Bus: I2cHardware,
    <F::Bus as I2cHardware>::Error: embedded_hal::i2c::Error,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.handle.with_bus(|bus| {
            trace!(
                "i2c transaction of {} operation(s) on {=u8:#x}",
                operations.len(),
                address,
            );
            bus.transaction(address, operations).map_err(|e| {
                warn!("i2c transaction on {=u8:#x} failed", address);
                Error::Bus(e)
            })
        })
    }
}
