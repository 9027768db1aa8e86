//! Outbound ports
//!
//! Capabilities the reservation service needs from the outside world.
//! Adapters live in `infrastructure`.

use async_trait::async_trait;

use super::charger::Charger;
use super::DomainResult;
use crate::shared::errors::AuthenticationFailure;

/// Key/value lookup for well-known settings such as the charger service
/// address and the token secret.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn lookup(&self, key: &str) -> DomainResult<String>;
}

/// Source of the current set of chargers.
#[async_trait]
pub trait ChargerDirectory: Send + Sync {
    async fn fetch_chargers(&self) -> DomainResult<Vec<Charger>>;
}

/// Turns a `"<scheme> <token>"` credential into a user id.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self, credential: &str) -> Result<String, AuthenticationFailure>;
}
