//! Shared domain models.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Number of seat columns in the cabin.
pub const COLUMNS: u8 = 80;

/// Columns whose E/F positions are carved out for storage.
pub const STORAGE_COLUMNS: [u8; 2] = [77, 78];

static SEAT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9][0-9]?)([A-F])$").expect("valid seat id regex"));

/// Seat position across a column, from window to window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RowLabel {
    /// Position A.
    A,
    /// Position B.
    B,
    /// Position C.
    C,
    /// Position D.
    D,
    /// Position E.
    E,
    /// Position F.
    F,
}

impl RowLabel {
    /// All labels in rendering order.
    pub const ALL: [RowLabel; 6] = [
        RowLabel::A,
        RowLabel::B,
        RowLabel::C,
        RowLabel::D,
        RowLabel::E,
        RowLabel::F,
    ];

    /// Single-letter form used in seat keys.
    pub fn as_char(self) -> char {
        match self {
            RowLabel::A => 'A',
            RowLabel::B => 'B',
            RowLabel::C => 'C',
            RowLabel::D => 'D',
            RowLabel::E => 'E',
            RowLabel::F => 'F',
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_char() == ch)
    }
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Composite seat key such as `1A` or `77E`.
///
/// Ordering is column-major, so iterating a sorted collection of ids walks the
/// cabin front to back with labels A through F inside each column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId {
    column: u8,
    label: RowLabel,
}

impl SeatId {
    /// Build a seat id, rejecting columns outside `1..=80`.
    pub fn new(column: u8, label: RowLabel) -> Result<Self, LedgerError> {
        if column == 0 || column > COLUMNS {
            return Err(LedgerError::InvalidSeatId(format!("{column}{label}")));
        }
        Ok(Self { column, label })
    }

    /// Every seat in the cabin, front to back.
    pub fn all() -> impl Iterator<Item = SeatId> {
        (1..=COLUMNS).flat_map(|column| {
            RowLabel::ALL
                .into_iter()
                .map(move |label| SeatId { column, label })
        })
    }

    /// Column number, starting at 1.
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Position within the column.
    pub fn label(&self) -> RowLabel {
        self.label
    }

    /// Whether this position belongs to the fixed storage zone.
    pub fn is_storage_zone(&self) -> bool {
        STORAGE_COLUMNS.contains(&self.column) && matches!(self.label, RowLabel::E | RowLabel::F)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.label)
    }
}

impl FromStr for SeatId {
    type Err = LedgerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidSeatId(input.to_string());
        let caps = SEAT_ID_RE.captures(input).ok_or_else(invalid)?;
        let column = caps[1].parse::<u8>().map_err(|_| invalid())?;
        let label = caps[2]
            .chars()
            .next()
            .and_then(RowLabel::from_char)
            .ok_or_else(invalid)?;
        Self::new(column, label).map_err(|_| invalid())
    }
}

/// Current state of a single seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    /// Open for booking.
    Free,
    /// Permanently withheld for non-passenger use.
    Storage,
    /// Held by the reservation with the given reference.
    Reserved(String),
}

impl SeatStatus {
    /// Short code used in the seat map rendering.
    pub fn code(&self) -> &'static str {
        match self {
            SeatStatus::Free => "F",
            SeatStatus::Storage => "S",
            SeatStatus::Reserved(_) => "Booked",
        }
    }

    /// Returns true for a seat that can be booked right now.
    pub fn is_free(&self) -> bool {
        matches!(self, SeatStatus::Free)
    }
}

/// Identity details captured when a seat is booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Travel document number.
    pub passport_number: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Passenger {
    /// Convenience constructor from borrowed parts.
    pub fn new(
        passport_number: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            passport_number: passport_number.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Returns a user-facing label combining first and last name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Active booking attached to a reserved seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique 8-character booking reference.
    pub reference: String,
    /// Seat held by this reservation.
    pub seat: SeatId,
    /// Passenger the seat is booked for.
    pub passenger: Passenger,
    /// When the booking was made.
    pub booked_at: DateTime<Utc>,
}

impl Reservation {
    pub(crate) fn new(reference: String, seat: SeatId, passenger: Passenger) -> Self {
        Self {
            reference,
            seat,
            passenger,
            booked_at: Utc::now(),
        }
    }
}

/// Seat counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Seats open for booking.
    pub free: usize,
    /// Seats held by a reservation.
    pub reserved: usize,
    /// Seats in the storage zone.
    pub storage: usize,
}

impl Occupancy {
    /// Total seats counted.
    pub fn total(&self) -> usize {
        self.free + self.reserved + self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_seat_ids() {
        let seat: SeatId = "1A".parse().unwrap();
        assert_eq!(seat.column(), 1);
        assert_eq!(seat.label(), RowLabel::A);

        let seat: SeatId = "80F".parse().unwrap();
        assert_eq!(seat.to_string(), "80F");
    }

    #[test]
    fn rejects_malformed_seat_ids() {
        for input in ["", "A1", "0A", "01A", "81A", "999Z", "1a", "1G", " 1A", "1AB", "100A"] {
            assert_eq!(
                input.parse::<SeatId>(),
                Err(LedgerError::InvalidSeatId(input.to_string())),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn storage_zone_covers_rear_window_pairs() {
        let storage: Vec<String> = SeatId::all()
            .filter(SeatId::is_storage_zone)
            .map(|seat| seat.to_string())
            .collect();
        assert_eq!(storage, vec!["77E", "77F", "78E", "78F"]);
    }

    #[test]
    fn cabin_has_480_seats() {
        assert_eq!(SeatId::all().count(), 480);
        assert_eq!(SeatId::all().last().map(|seat| seat.to_string()).as_deref(), Some("80F"));
    }

    #[test]
    fn seat_ids_sort_column_major() {
        let mut seats: Vec<SeatId> = ["2A", "1F", "10B", "1A"]
            .iter()
            .map(|raw| raw.parse().unwrap())
            .collect();
        seats.sort();
        let rendered: Vec<String> = seats.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1A", "1F", "2A", "10B"]);
    }
}
