use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid reference: {field}={value}")]
    InvalidReference { field: &'static str, value: String },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("No charger candidates available")]
    NoCandidates,

    #[error("Charger directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("{operation} timed out after {}s", after.as_secs_f64())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Service registry: {0}")]
    Registry(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn reservation_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity: "Reservation",
            field: "id",
            value: id.into(),
        }
    }

    /// Whether the caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::DirectoryUnavailable(_) | DomainError::Timeout { .. }
        )
    }
}

/// The presented credential could not be turned into a user identity.
///
/// Kept apart from [`DomainError`]: callers report it as a status, not as a
/// failure of the request.
#[derive(Debug, Error)]
pub enum AuthenticationFailure {
    #[error("credential is not of the form '<scheme> <token>'")]
    MalformedCredential,

    #[error("verification secret unavailable: {0}")]
    SecretUnavailable(String),

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("token carries no user_id claim")]
    MissingUserId,
}
