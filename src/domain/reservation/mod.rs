//! Reservation aggregate
//!
//! Contains the Reservation entity, related types, and repository interface.

pub mod model;
pub mod repository;

pub use model::{format_timestamp, next_modified, NewReservation, Reservation};
pub use repository::{ReservationFilter, ReservationRepository};
