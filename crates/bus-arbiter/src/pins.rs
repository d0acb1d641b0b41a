/// Pins owned by an SPI bus.
///
/// Either data line may be absent for send-only or receive-only wiring.
/// Chip-select lines are not managed here.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPins<P> {
    pub clock: P,
    pub mosi: Option<P>,
    pub miso: Option<P>,
}

impl<P> SpiPins<P> {
    pub fn new(clock: P, mosi: Option<P>, miso: Option<P>) -> Self {
        Self { clock, mosi, miso }
    }

    /// No MISO line: the bus can only clock data out.
    pub fn is_send_only(&self) -> bool {
        self.miso.is_none()
    }

    /// No MOSI line: the bus can only clock data in.
    pub fn is_receive_only(&self) -> bool {
        self.mosi.is_none()
    }
}

/// Pins owned by an I2C bus.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cPins<P> {
    pub scl: P,
    pub sda: P,
}

impl<P> I2cPins<P> {
    pub fn new(scl: P, sda: P) -> Self {
        Self { scl, sda }
    }
}
