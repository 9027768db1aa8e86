pub mod errors;
pub mod shutdown;

pub use errors::{AuthenticationFailure, DomainError};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
