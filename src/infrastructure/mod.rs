//! Infrastructure layer - adapters for the domain ports

pub mod crypto;
pub mod database;
pub mod directory;
pub mod registry;
pub mod storage;

pub use crypto::JwtIdentityResolver;
pub use database::{init_database, DatabaseConfig, SeaOrmReservationRepository};
pub use directory::HttpChargerDirectory;
pub use registry::{ConsulRegistry, StaticRegistry};
pub use storage::{InMemoryReservationRepository, StoreTimeouts, TimedReservationRepository};
