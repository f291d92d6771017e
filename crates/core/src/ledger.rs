//! In-memory seat ledger for a single cabin.

use std::collections::{BTreeMap, HashMap};

use rand::RngCore;
use tracing::{debug, info};

use crate::{
    error::LedgerError,
    models::{Occupancy, Passenger, Reservation, SeatId, SeatStatus, COLUMNS},
    reference::ReferenceGenerator,
};

/// Authoritative record of every seat status and active reservation.
///
/// The seat map is the single source of truth for whether a seat is taken;
/// reservations are keyed by reference and exist exactly as long as the seat
/// they point at is `Reserved` with that reference.
#[derive(Debug)]
pub struct SeatLedger {
    seats: BTreeMap<SeatId, SeatStatus>,
    reservations: HashMap<String, Reservation>,
    references: ReferenceGenerator,
}

impl SeatLedger {
    /// Build the full cabin with references drawn from OS entropy.
    pub fn new() -> Self {
        Self::with_references(ReferenceGenerator::from_entropy())
    }

    /// Build the full cabin with references drawn from the given source.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self::with_references(ReferenceGenerator::new(rng))
    }

    /// Build the full cabin around an existing reference generator.
    pub fn with_references(references: ReferenceGenerator) -> Self {
        let seats: BTreeMap<SeatId, SeatStatus> = SeatId::all()
            .map(|seat| {
                let status = if seat.is_storage_zone() {
                    SeatStatus::Storage
                } else {
                    SeatStatus::Free
                };
                (seat, status)
            })
            .collect();
        info!(seats = seats.len(), "seat ledger initialised");
        Self {
            seats,
            reservations: HashMap::new(),
            references,
        }
    }

    /// Returns true only when the seat exists and is free.
    pub fn check_availability(&self, seat: &str) -> bool {
        self.status(seat).map(SeatStatus::is_free).unwrap_or(false)
    }

    /// Current status of a seat, or `None` for an unknown key.
    pub fn status(&self, seat: &str) -> Option<&SeatStatus> {
        let id = seat.parse::<SeatId>().ok()?;
        self.seats.get(&id)
    }

    /// Reserve a free seat and return the new booking reference.
    pub fn book_seat(&mut self, seat: &str, passenger: Passenger) -> Result<String, LedgerError> {
        let id = self.resolve(seat)?;
        if !self.seats.get(&id).is_some_and(SeatStatus::is_free) {
            debug!(seat = %id, "booking refused");
            return Err(LedgerError::SeatNotFree(id));
        }

        let reference = self.references.generate();
        self.seats.insert(id, SeatStatus::Reserved(reference.clone()));
        self.reservations.insert(
            reference.clone(),
            Reservation::new(reference.clone(), id, passenger),
        );
        debug!(seat = %id, %reference, "seat booked");
        Ok(reference)
    }

    /// Release a reserved seat. The reference stays consumed.
    pub fn free_seat(&mut self, seat: &str) -> Result<(), LedgerError> {
        let id = self.resolve(seat)?;
        let status = self
            .seats
            .get_mut(&id)
            .ok_or_else(|| LedgerError::SeatUnknown(seat.to_string()))?;
        let reference = match status {
            SeatStatus::Reserved(reference) => std::mem::take(reference),
            _ => {
                debug!(seat = %id, "release refused");
                return Err(LedgerError::SeatNotReserved(id));
            }
        };
        *status = SeatStatus::Free;
        self.reservations.remove(&reference);
        debug!(seat = %id, %reference, "seat freed");
        Ok(())
    }

    /// One display row per column, e.g. `1A(F) 1B(Booked) ... 1F(F)`.
    pub fn render_state(&self) -> Vec<String> {
        let mut rows = vec![Vec::new(); usize::from(COLUMNS)];
        for (seat, status) in &self.seats {
            rows[usize::from(seat.column()) - 1].push(format!("{seat}({})", status.code()));
        }
        rows.into_iter().map(|entries| entries.join(" ")).collect()
    }

    /// Active reservation for a booking reference.
    pub fn reservation(&self, reference: &str) -> Option<&Reservation> {
        self.reservations.get(reference)
    }

    /// Active reservation holding the given seat.
    pub fn reservation_for_seat(&self, seat: &str) -> Option<&Reservation> {
        match self.status(seat)? {
            SeatStatus::Reserved(reference) => self.reservations.get(reference),
            _ => None,
        }
    }

    /// Count seats by status.
    pub fn occupancy(&self) -> Occupancy {
        self.seats
            .values()
            .fold(Occupancy::default(), |mut acc, status| {
                match status {
                    SeatStatus::Free => acc.free += 1,
                    SeatStatus::Storage => acc.storage += 1,
                    SeatStatus::Reserved(_) => acc.reserved += 1,
                }
                acc
            })
    }

    /// Number of references consumed over the ledger's lifetime.
    pub fn issued_references(&self) -> usize {
        self.references.issued_count()
    }

    fn resolve(&self, seat: &str) -> Result<SeatId, LedgerError> {
        seat.parse::<SeatId>()
            .ok()
            .filter(|id| self.seats.contains_key(id))
            .ok_or_else(|| LedgerError::SeatUnknown(seat.to_string()))
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::reference::REFERENCE_LEN;

    fn ledger() -> SeatLedger {
        SeatLedger::with_rng(StdRng::seed_from_u64(2024))
    }

    fn passenger() -> Passenger {
        Passenger::new("P123", "Ann", "Lee")
    }

    fn all_seat_keys() -> Vec<String> {
        SeatId::all().map(|seat| seat.to_string()).collect()
    }

    #[test]
    fn storage_zone_is_fixed_at_construction() {
        let ledger = ledger();
        for key in all_seat_keys() {
            let status = ledger.status(&key).expect("every key exists");
            let expected_storage = matches!(key.as_str(), "77E" | "77F" | "78E" | "78F");
            assert_eq!(*status == SeatStatus::Storage, expected_storage, "{key}");
            assert_eq!(ledger.check_availability(&key), !expected_storage, "{key}");
        }
        assert_eq!(
            ledger.occupancy(),
            Occupancy {
                free: 476,
                reserved: 0,
                storage: 4
            }
        );
    }

    #[test]
    fn unknown_seats_are_unavailable() {
        let ledger = ledger();
        for key in ["999Z", "0A", "81A", "1G", "1a", "", "A1"] {
            assert!(!ledger.check_availability(key), "{key}");
        }
    }

    #[test]
    fn book_then_free_round_trip() {
        let mut ledger = ledger();
        let before = ledger.render_state();

        let reference = ledger.book_seat("1A", passenger()).unwrap();
        assert_eq!(reference.len(), REFERENCE_LEN);
        assert!(!ledger.check_availability("1A"));

        let reservation = ledger.reservation(&reference).unwrap();
        assert_eq!(reservation.seat.to_string(), "1A");
        assert_eq!(reservation.passenger, passenger());
        assert_eq!(
            ledger.reservation_for_seat("1A").map(|r| r.reference.as_str()),
            Some(reference.as_str())
        );

        ledger.free_seat("1A").unwrap();
        assert!(ledger.check_availability("1A"));
        assert!(ledger.reservation(&reference).is_none());
        assert!(ledger.reservation_for_seat("1A").is_none());
        assert_eq!(ledger.render_state(), before);
    }

    #[test]
    fn double_booking_keeps_first_reservation() {
        let mut ledger = ledger();
        let reference = ledger.book_seat("5C", passenger()).unwrap();

        let second = ledger.book_seat("5C", Passenger::new("X999", "Bob", "Ray"));
        assert_eq!(
            second,
            Err(LedgerError::SeatNotFree("5C".parse().unwrap()))
        );
        assert_eq!(
            ledger.status("5C"),
            Some(&SeatStatus::Reserved(reference.clone()))
        );
        assert_eq!(ledger.reservation(&reference).unwrap().passenger, passenger());
        assert_eq!(ledger.issued_references(), 1);
    }

    #[test]
    fn double_free_is_refused_cleanly() {
        let mut ledger = ledger();
        ledger.book_seat("10D", passenger()).unwrap();
        ledger.free_seat("10D").unwrap();
        assert_eq!(
            ledger.free_seat("10D"),
            Err(LedgerError::SeatNotReserved("10D".parse().unwrap()))
        );
        assert!(ledger.check_availability("10D"));
    }

    #[test]
    fn storage_seats_reject_booking_and_freeing() {
        let mut ledger = ledger();
        let before = ledger.render_state();
        for key in ["77E", "77F", "78E", "78F"] {
            assert!(matches!(
                ledger.book_seat(key, passenger()),
                Err(LedgerError::SeatNotFree(_))
            ));
            assert!(matches!(
                ledger.free_seat(key),
                Err(LedgerError::SeatNotReserved(_))
            ));
            assert_eq!(ledger.status(key), Some(&SeatStatus::Storage));
        }
        assert_eq!(ledger.render_state(), before);
        assert_eq!(ledger.issued_references(), 0);
    }

    #[test]
    fn unknown_seat_booking_leaves_ledger_unchanged() {
        let mut ledger = ledger();
        let before = ledger.render_state();
        assert_eq!(
            ledger.book_seat("999Z", passenger()),
            Err(LedgerError::SeatUnknown("999Z".to_string()))
        );
        assert_eq!(
            ledger.free_seat("999Z"),
            Err(LedgerError::SeatUnknown("999Z".to_string()))
        );
        assert_eq!(ledger.render_state(), before);
        assert_eq!(ledger.issued_references(), 0);
    }

    #[test]
    fn booking_one_seat_leaves_others_untouched() {
        let mut ledger = ledger();
        ledger.book_seat("40B", passenger()).unwrap();
        ledger.free_seat("40B").unwrap();
        for key in all_seat_keys() {
            let storage = matches!(key.as_str(), "77E" | "77F" | "78E" | "78F");
            assert_eq!(ledger.check_availability(&key), !storage, "{key}");
        }
    }

    #[test]
    fn filling_the_cabin_yields_distinct_references() {
        let mut ledger = ledger();
        let mut references = HashSet::new();
        for key in all_seat_keys() {
            if let Ok(reference) = ledger.book_seat(&key, passenger()) {
                assert_eq!(reference.len(), REFERENCE_LEN);
                assert!(reference
                    .chars()
                    .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()));
                assert!(references.insert(reference));
            }
        }
        assert_eq!(references.len(), 476);
        assert_eq!(ledger.occupancy().reserved, 476);
        assert_eq!(ledger.occupancy().free, 0);
    }

    #[test]
    fn released_references_are_not_reissued() {
        let mut ledger = ledger();
        let first = ledger.book_seat("3A", passenger()).unwrap();
        ledger.free_seat("3A").unwrap();
        let second = ledger.book_seat("3A", passenger()).unwrap();
        assert_ne!(first, second);
        assert_eq!(ledger.issued_references(), 2);
        assert!(ledger.reservation(&first).is_none());
    }

    #[test]
    fn render_state_lists_every_column() {
        let mut ledger = ledger();
        ledger.book_seat("1B", passenger()).unwrap();
        let rows = ledger.render_state();
        assert_eq!(rows.len(), 80);
        assert_eq!(rows[0], "1A(F) 1B(Booked) 1C(F) 1D(F) 1E(F) 1F(F)");
        assert_eq!(rows[76], "77A(F) 77B(F) 77C(F) 77D(F) 77E(S) 77F(S)");
        assert_eq!(rows[79], "80A(F) 80B(F) 80C(F) 80D(F) 80E(F) 80F(F)");
    }

    #[test]
    fn render_state_groups_seats_by_column_in_label_order() {
        let mut ledger = ledger();
        ledger.book_seat("80A", passenger()).unwrap();
        ledger.book_seat("9F", passenger()).unwrap();
        let rows = ledger.render_state();
        assert_eq!(rows.len(), usize::from(COLUMNS));
        for (idx, row) in rows.iter().enumerate() {
            let column = idx + 1;
            let labels: Vec<String> = row
                .split(' ')
                .map(|entry| entry.split('(').next().unwrap_or_default().to_string())
                .collect();
            let expected: Vec<String> = ["A", "B", "C", "D", "E", "F"]
                .iter()
                .map(|label| format!("{column}{label}"))
                .collect();
            assert_eq!(labels, expected, "row {column}");
        }
        assert_eq!(rows[8], "9A(F) 9B(F) 9C(F) 9D(F) 9E(F) 9F(Booked)");
        assert!(rows[79].starts_with("80A(Booked) 80B(F)"));
    }
}
