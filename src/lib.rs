//! # EV Charging Reservations
//!
//! Reserves charging slots on electric-vehicle chargers, either on a
//! charger named by the caller or on whichever charger a remote directory
//! lists closest to a location.
//!
//! ## Architecture
//!
//! - **domain**: entities, distance and nearest-charger rules, ports
//! - **application**: the reservation use cases
//! - **infrastructure**: SeaORM / in-memory stores, directory client,
//!   service registry, JWT identity
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{ReservationOutcome, ReservationService};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
