//! Consul KV backed registry
//!
//! Values are read with `GET <address>/v1/kv/<key>?raw`, which returns the
//! stored bytes without the JSON envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::domain::{DomainError, DomainResult, ServiceRegistry};

pub struct ConsulRegistry {
    address: String,
    client: reqwest::Client,
}

impl ConsulRegistry {
    pub fn new(address: impl Into<String>, timeout: Duration) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Registry(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            address: address.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/v1/kv/{}?raw", self.address, key)
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    async fn lookup(&self, key: &str) -> DomainResult<String> {
        let url = self.key_url(key);
        debug!(%url, "Consul KV lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Registry(format!("consul request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map(|v| v.trim().to_string())
                .map_err(|e| DomainError::Registry(format!("consul body unreadable: {}", e))),
            StatusCode::NOT_FOUND => Err(DomainError::Registry(format!(
                "consul has no value for key '{}'",
                key
            ))),
            status => Err(DomainError::Registry(format!(
                "consul returned {} for key '{}'",
                status, key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_raw_kv_url() {
        let registry = ConsulRegistry::new("http://consul:8500/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            registry.key_url("chargersService"),
            "http://consul:8500/v1/kv/chargersService?raw"
        );
    }

    #[tokio::test]
    async fn unreachable_consul_is_registry_error() {
        // port 9 (discard) is closed on test hosts
        let registry = ConsulRegistry::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = registry.lookup("jwtSecret").await.unwrap_err();
        assert!(matches!(err, DomainError::Registry(_)));
    }
}
