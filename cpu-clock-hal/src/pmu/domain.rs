//! Power-management domain callback registry.
//!
//! Each domain owns an ordered list of driver callbacks behind its own
//! critical-section lock. The lock is held only while the list is edited or
//! walked.

use core::cell::RefCell;
use core::ptr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

/// Registry error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Domain index is out of range.
    InvalidDomain { domain: usize },
    /// Domain already holds as many callbacks as it can.
    RegistryFull { domain: usize },
}

/// Power state reported to registered callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PmState {
    Normal,
    Idle,
    Standby,
    Sleep,
}

/// Callbacks a driver registers with a power domain.
///
/// Handles are compared by address, so the same `static` must be passed to
/// [`DomainRegistry::register`] and [`DomainRegistry::unregister`].
pub struct PmCallback {
    /// Driver name, for diagnostics.
    pub name: &'static str,
    pub notify: fn(domain: usize, state: PmState),
}

type CallbackList<const N: usize> = RefCell<Vec<&'static PmCallback, N>>;

/// `DOMAINS` domains, each holding up to `CAPACITY` callbacks.
pub struct DomainRegistry<const DOMAINS: usize, const CAPACITY: usize> {
    domains: [Mutex<CriticalSectionRawMutex, CallbackList<CAPACITY>>; DOMAINS],
}

impl<const DOMAINS: usize, const CAPACITY: usize> Default for DomainRegistry<DOMAINS, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DOMAINS: usize, const CAPACITY: usize> DomainRegistry<DOMAINS, CAPACITY> {
    pub const fn new() -> Self {
        Self {
            domains: [const { Mutex::new(RefCell::new(Vec::new())) }; DOMAINS],
        }
    }

    fn domain(
        &self,
        domain: usize,
    ) -> Result<&Mutex<CriticalSectionRawMutex, CallbackList<CAPACITY>>, Error> {
        self.domains.get(domain).ok_or(Error::InvalidDomain { domain })
    }

    /// Append `cb` to `domain`. Registering the same handle twice is a no-op.
    pub fn register(&self, domain: usize, cb: &'static PmCallback) -> Result<(), Error> {
        self.domain(domain)?.lock(|list| {
            let mut list = list.borrow_mut();
            if list.iter().any(|c| ptr::eq(*c, cb)) {
                return Ok(());
            }
            list.push(cb).map_err(|_| Error::RegistryFull { domain })?;
            trace!("pm: registered {} on domain {}", cb.name, domain);
            Ok(())
        })
    }

    /// Remove `cb` from `domain`.
    ///
    /// Removing a handle that was never registered succeeds and changes nothing.
    pub fn unregister(&self, domain: usize, cb: &'static PmCallback) -> Result<(), Error> {
        self.domain(domain)?.lock(|list| {
            let mut list = list.borrow_mut();
            if let Some(pos) = list.iter().position(|c| ptr::eq(*c, cb)) {
                list.remove(pos);
                trace!("pm: unregistered {} from domain {}", cb.name, domain);
            }
        });
        Ok(())
    }

    pub fn contains(&self, domain: usize, cb: &'static PmCallback) -> Result<bool, Error> {
        Ok(self
            .domain(domain)?
            .lock(|list| list.borrow().iter().any(|c| ptr::eq(*c, cb))))
    }

    pub fn len(&self, domain: usize) -> Result<usize, Error> {
        Ok(self.domain(domain)?.lock(|list| list.borrow().len()))
    }

    pub fn is_empty(&self, domain: usize) -> Result<bool, Error> {
        self.len(domain).map(|n| n == 0)
    }

    /// Call every callback of `domain` in registration order.
    ///
    /// Runs inside the domain's critical section; callbacks must not touch
    /// the registry.
    pub fn notify(&self, domain: usize, state: PmState) -> Result<(), Error> {
        self.domain(domain)?.lock(|list| {
            for cb in list.borrow().iter() {
                (cb.notify)(domain, state);
            }
        });
        Ok(())
    }
}
