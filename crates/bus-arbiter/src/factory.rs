/// Abstracts creation and release of the hardware behind a bus.
///
/// Implementors define how the peripheral is brought up from its resources
/// (pins, peripheral singletons) and how those resources are recovered once
/// the bus is torn down. The created [`Bus`](Self::Bus) additionally
/// implements [`SpiHardware`](crate::SpiHardware) or
/// [`I2cHardware`](crate::I2cHardware) for the transfer primitives.
pub trait BusFactory {
    /// The hardware driver owned by the bus object.
    type Bus;
    /// Resources needed to create the bus (e.g., peripheral handles, pins).
    type Resources;
    /// Parameters fixed at construction time (`()` when there are none).
    type Config;
    /// Opaque token that can reconstruct [`Resources`](Self::Resources)
    /// after the bus is dropped.
    type Destructor;
    /// Error type for bus creation failures.
    type Error: core::fmt::Debug;

    /// Create a bus from the given resources.
    ///
    /// On success, returns the bus instance and a destructor token.
    /// On failure, returns the error **and** the original resources so they
    /// are not lost.
    fn create(
        resources: Self::Resources,
        config: &Self::Config,
    ) -> Result<(Self::Bus, Self::Destructor), (Self::Error, Self::Resources)>;

    /// Recover the original resources from a destructor token.
    ///
    /// Called at most once per successful [`create`](Self::create), after
    /// the bus value has been dropped.
    fn recover(destructor: Self::Destructor) -> Self::Resources;
}
