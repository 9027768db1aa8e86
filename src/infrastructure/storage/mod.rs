//! Reservation store backends that are not tied to a database,
//! plus the timeout decorator applied to every backend.

mod memory;
mod timed;

pub use memory::InMemoryReservationRepository;
pub use timed::{StoreTimeouts, TimedReservationRepository};
