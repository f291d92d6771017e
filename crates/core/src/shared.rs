//! Lock-guarded ledger handle for callers on several threads.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::LedgerError,
    ledger::SeatLedger,
    models::{Occupancy, Passenger, Reservation},
};

/// Cloneable handle to a single ledger.
///
/// Each method holds the lock for the whole operation, so the check, draw,
/// and update steps of a booking cannot interleave with another caller.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<SeatLedger>>,
}

impl SharedLedger {
    /// Wrap an existing ledger.
    pub fn new(ledger: SeatLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// See [`SeatLedger::check_availability`].
    pub fn check_availability(&self, seat: &str) -> bool {
        self.inner.lock().check_availability(seat)
    }

    /// See [`SeatLedger::book_seat`].
    pub fn book_seat(&self, seat: &str, passenger: Passenger) -> Result<String, LedgerError> {
        self.inner.lock().book_seat(seat, passenger)
    }

    /// See [`SeatLedger::free_seat`].
    pub fn free_seat(&self, seat: &str) -> Result<(), LedgerError> {
        self.inner.lock().free_seat(seat)
    }

    /// See [`SeatLedger::render_state`].
    pub fn render_state(&self) -> Vec<String> {
        self.inner.lock().render_state()
    }

    /// See [`SeatLedger::occupancy`].
    pub fn occupancy(&self) -> Occupancy {
        self.inner.lock().occupancy()
    }

    /// Owned copy of the reservation holding a seat.
    pub fn reservation_for_seat(&self, seat: &str) -> Option<Reservation> {
        self.inner.lock().reservation_for_seat(seat).cloned()
    }

    /// Run a closure with exclusive access to the ledger.
    pub fn with<T>(&self, f: impl FnOnce(&mut SeatLedger) -> T) -> T {
        f(&mut self.inner.lock())
    }
}

impl From<SeatLedger> for SharedLedger {
    fn from(ledger: SeatLedger) -> Self {
        Self::new(ledger)
    }
}
