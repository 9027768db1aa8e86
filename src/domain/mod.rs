//! Domain layer: entities, pure rules and the ports the application
//! layer drives.

pub mod charger;
pub mod ids;
pub mod location;
pub mod ports;
pub mod reservation;

pub use charger::{select_nearest, Charger};
pub use ids::{MalformedId, ObjectId};
pub use location::{distance, Location};
pub use ports::{ChargerDirectory, IdentityResolver, ServiceRegistry};
pub use reservation::{NewReservation, Reservation, ReservationFilter, ReservationRepository};

pub use crate::shared::errors::{AuthenticationFailure, DomainError};

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
