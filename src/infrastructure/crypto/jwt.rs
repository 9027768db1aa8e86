//! JWT identity resolution
//!
//! Credentials arrive as `"<scheme> <token>"`. The token is an HS256 JWT
//! whose `user_id` claim names the caller. The signing secret is read from
//! the registry on every call so it can be rotated without a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{IdentityResolver, ServiceRegistry};
use crate::shared::errors::AuthenticationFailure;

/// Split `"<scheme> <token>"` and return the token.
pub fn split_credential(credential: &str) -> Result<&str, AuthenticationFailure> {
    let parts: Vec<&str> = credential.split(' ').collect();
    match parts.as_slice() {
        [_scheme, token] => Ok(*token),
        _ => Err(AuthenticationFailure::MalformedCredential),
    }
}

/// Verify `token` against `secret` and return its `user_id` claim.
///
/// `exp` is enforced when present but not required.
pub fn verify_token(token: &str, secret: &str) -> Result<String, AuthenticationFailure> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    let data = decode::<HashMap<String, Value>>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AuthenticationFailure::InvalidToken(e.to_string()))?;

    match data.claims.get("user_id") {
        Some(Value::String(user_id)) if !user_id.is_empty() => Ok(user_id.clone()),
        _ => Err(AuthenticationFailure::MissingUserId),
    }
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    user_id: &'a str,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Sign a token for `user_id`, the counterpart of [`verify_token`].
pub fn issue_token(
    user_id: &str,
    secret: &str,
    ttl: Option<Duration>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = IssuedClaims {
        user_id,
        iat: now.timestamp(),
        exp: ttl.map(|ttl| (now + ttl).timestamp()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub struct JwtIdentityResolver {
    registry: Arc<dyn ServiceRegistry>,
    secret_key: String,
}

impl JwtIdentityResolver {
    /// `secret_key` is the registry key holding the signing secret.
    pub fn new(registry: Arc<dyn ServiceRegistry>, secret_key: impl Into<String>) -> Self {
        Self {
            registry,
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve_identity(&self, credential: &str) -> Result<String, AuthenticationFailure> {
        let token = split_credential(credential)?;
        let secret = self
            .registry
            .lookup(&self.secret_key)
            .await
            .map_err(|e| AuthenticationFailure::SecretUnavailable(e.to_string()))?;
        verify_token(token, &secret)
    }
}
