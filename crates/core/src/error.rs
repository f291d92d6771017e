//! Failure taxonomy for ledger operations.

use thiserror::Error;

use crate::models::SeatId;

/// Reasons a ledger operation can be refused.
///
/// Every variant is local and non-fatal: the ledger is left untouched when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The seat key does not address any seat in the cabin.
    #[error("seat {0} does not exist")]
    SeatUnknown(String),
    /// The seat is a storage seat or already reserved.
    #[error("seat {0} is not free")]
    SeatNotFree(SeatId),
    /// The seat is free or a storage seat, so there is nothing to release.
    #[error("seat {0} is not reserved")]
    SeatNotReserved(SeatId),
    /// The input could not be parsed as a seat key.
    #[error("invalid seat id '{0}'")]
    InvalidSeatId(String),
}
