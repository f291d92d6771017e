#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Seatbook cabin ledger.
//!
//! This crate hosts the seat models, the in-memory seat ledger with its
//! reference generator, a lock-guarded handle for shared access, and the
//! configuration used by the terminal UI and any future frontends.

pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reference;
pub mod shared;

pub use config::AppConfig;
pub use error::LedgerError;
pub use ledger::SeatLedger;
pub use models::{Occupancy, Passenger, Reservation, RowLabel, SeatId, SeatStatus};
pub use reference::ReferenceGenerator;
pub use shared::SharedLedger;
