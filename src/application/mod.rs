//! Application layer: use-case orchestration over the domain ports

pub mod reservations;

pub use reservations::{ReservationOutcome, ReservationService};
