pub mod service;

pub use service::{ReservationOutcome, ReservationService, STATUS_AUTHORIZATION_FAILED, STATUS_OK};
