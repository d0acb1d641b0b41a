use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::Error;
use crate::factory::BusFactory;
use crate::lock::BusLock;

/// Lifecycle of the hardware owned by a handle.
enum Phase<F: BusFactory> {
    /// Hardware is up; the destructor recovers its resources.
    ///
    /// `bus` is `None` while a transfer has the hardware checked out.
    Active {
        bus: Option<F::Bus>,
        destructor: F::Destructor,
    },
    /// `deinit` arrived while the hardware was checked out. The transfer
    /// finishes the release when it checks the hardware back in.
    Retiring { destructor: F::Destructor },
    /// Hardware has been released. `resources` holds what a deferred
    /// release recovered until the next `deinit` collects it.
    Released { resources: Option<F::Resources> },
}

/// What `deinit` found when it took the phase over.
enum Teardown<F: BusFactory> {
    Release(F::Bus, F::Destructor),
    Deferred,
    Done(Option<F::Resources>),
}

/// Owner of one bus peripheral plus its arbitration lock.
///
/// The hardware is created when the handle is constructed and released
/// exactly once, by the first [`deinit`](Self::deinit) or, failing that,
/// when the handle is dropped. All methods take `&self` so one handle can
/// be shared between clients; `M` selects the mutex protecting the
/// lifecycle state (`NoopRawMutex` within one execution context,
/// `CriticalSectionRawMutex` across several).
///
/// The mutex is held only while the phase changes. Transfers check the
/// hardware out, run with the mutex released and check it back in.
pub struct BusHandle<M: RawMutex, F: BusFactory> {
    lock: BusLock,
    state: Mutex<M, RefCell<Phase<F>>>,
}

/// Hardware checked out of a handle for one transfer.
///
/// Dropping it, including during unwinding, checks the hardware back in.
struct Checkout<'a, M: RawMutex, F: BusFactory> {
    handle: &'a BusHandle<M, F>,
    bus: Option<F::Bus>,
}

impl<M: RawMutex, F: BusFactory> Drop for Checkout<'_, M, F> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.take() {
            self.handle.check_in(bus);
        }
    }
}

impl<M: RawMutex, F: BusFactory> BusHandle<M, F> {
    /// Bring up the hardware. The lock starts out free.
    ///
    /// On failure the factory's error is returned together with the
    /// resources.
    pub fn new(
        resources: F::Resources,
        config: &F::Config,
    ) -> Result<Self, (F::Error, F::Resources)> {
        let (bus, destructor) = F::create(resources, config)?;
        debug!("bus hardware created");

        Ok(Self {
            lock: BusLock::new(),
            state: Mutex::new(RefCell::new(Phase::Active {
                bus: Some(bus),
                destructor,
            })),
        })
    }

    /// Attempt to take the bus lock. Returns `true` on success.
    ///
    /// Always fails once the handle has been deinitialized.
    pub fn try_lock(&self) -> bool {
        if !self.is_active() {
            warn!("try_lock on a deinitialized bus");
            return false;
        }

        if !self.lock.try_lock() {
            trace!("bus lock busy");
            return false;
        }

        // A deinit may have slipped in between the check and the exchange.
        if !self.is_active() {
            self.lock.unlock();
            warn!("try_lock raced with deinit");
            return false;
        }

        trace!("bus lock acquired");
        true
    }

    /// Whether the bus lock is held.
    pub fn has_lock(&self) -> bool {
        self.lock.has_lock()
    }

    /// Release the bus lock.
    ///
    /// The lock is advisory and not tied to a caller: this clears it even
    /// when the caller never acquired it.
    pub fn unlock(&self) {
        self.lock.unlock();
        trace!("bus lock released");
    }

    /// Whether the hardware is still owned by this handle.
    pub fn is_active(&self) -> bool {
        self.state
            .lock(|state| matches!(&*state.borrow(), Phase::Active { .. }))
    }

    /// Fail with [`Error::LockRequired`] unless the lock is held.
    pub(crate) fn require_lock<E>(&self) -> Result<(), Error<E>> {
        if self.lock.has_lock() {
            Ok(())
        } else {
            Err(Error::LockRequired)
        }
    }

    /// Run `f` on the hardware, provided the lock is held.
    ///
    /// The lock is checked before the hardware state is touched, and `f`
    /// runs without the state mutex held.
    pub(crate) fn with_bus<R, E>(
        &self,
        f: impl FnOnce(&mut F::Bus) -> Result<R, Error<E>>,
    ) -> Result<R, Error<E>> {
        self.require_lock::<E>()?;

        let mut checkout = Checkout { handle: self, bus: None };
        checkout.bus = self.state.lock(|state| {
            match &mut *state.borrow_mut() {
                Phase::Active { bus, .. } => bus.take(),
                _ => None,
            }
        });

        // Released, or still checked out by a client whose lock was
        // cleared under it.
        let Some(bus) = checkout.bus.as_mut() else {
            return Err(Error::LockRequired);
        };
        f(bus)
    }

    /// Return checked-out hardware, finishing a release that `deinit`
    /// deferred meanwhile.
    fn check_in(&self, bus: F::Bus) {
        let retired = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if let Phase::Active { bus: slot, .. } = &mut *state {
                *slot = Some(bus);
                return None;
            }
            match core::mem::replace(
                &mut *state,
                Phase::Released { resources: None },
            ) {
                Phase::Retiring { destructor } => Some((bus, destructor)),
                other => {
                    *state = other;
                    None
                }
            }
        });

        if let Some((bus, destructor)) = retired {
            drop(bus);
            let resources = F::recover(destructor);
            debug!("bus hardware released after transfer");
            self.state.lock(|state| {
                *state.borrow_mut() =
                    Phase::Released { resources: Some(resources) };
            });
        }
    }

    /// Release the hardware and clear the lock.
    ///
    /// Returns the original resources on the first call and `None` on every
    /// later one; the hardware is never released twice. A `deinit` issued
    /// while another client is mid-transfer returns `None` and the release
    /// happens when that transfer ends; the next `deinit` then returns the
    /// resources.
    pub fn deinit(&self) -> Option<F::Resources> {
        let teardown = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            match core::mem::replace(
                &mut *state,
                Phase::Released { resources: None },
            ) {
                Phase::Active { bus: Some(bus), destructor } => {
                    Teardown::<F>::Release(bus, destructor)
                }
                Phase::Active { bus: None, destructor }
                | Phase::Retiring { destructor } => {
                    *state = Phase::Retiring { destructor };
                    Teardown::Deferred
                }
                Phase::Released { resources } => Teardown::Done(resources),
            }
        });
        self.lock.unlock();

        match teardown {
            Teardown::Release(bus, destructor) => {
                drop(bus);
                debug!("bus hardware released");
                Some(F::recover(destructor))
            }
            Teardown::Deferred => {
                debug!("bus release deferred to in-flight transfer");
                None
            }
            Teardown::Done(resources) => resources,
        }
    }
}

impl<M: RawMutex, F: BusFactory> Drop for BusHandle<M, F> {
    fn drop(&mut self) {
        let _ = self.deinit();
    }
}
