//! HTTP client for the sibling charger service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Charger, ChargerDirectory, DomainError, DomainResult, ServiceRegistry};

#[derive(Debug, Deserialize)]
struct ChargersResponse {
    chargers: Vec<Charger>,
}

/// Fetches `<base>/chargers`, where `<base>` is looked up in the registry
/// under `service_key` on every call.
pub struct HttpChargerDirectory {
    registry: Arc<dyn ServiceRegistry>,
    service_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChargerDirectory {
    pub fn new(
        registry: Arc<dyn ServiceRegistry>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::DirectoryUnavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            registry,
            service_key: service_key.into(),
            client,
            timeout,
        })
    }

    fn map_request_error(&self, e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::Timeout {
                operation: "fetch_chargers",
                after: self.timeout,
            }
        } else if e.is_decode() {
            DomainError::DirectoryUnavailable(format!("malformed chargers response: {}", e))
        } else {
            DomainError::DirectoryUnavailable(e.to_string())
        }
    }
}

#[async_trait]
impl ChargerDirectory for HttpChargerDirectory {
    async fn fetch_chargers(&self) -> DomainResult<Vec<Charger>> {
        let base = self
            .registry
            .lookup(&self.service_key)
            .await
            .map_err(|e| DomainError::DirectoryUnavailable(format!("cannot resolve '{}': {}", self.service_key, e)))?;
        let url = format!("{}/chargers", base.trim_end_matches('/'));
        debug!(%url, "Fetching chargers");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(DomainError::DirectoryUnavailable(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        let body: ChargersResponse = response.json().await.map_err(|e| self.map_request_error(e))?;
        debug!(count = body.chargers.len(), "Chargers fetched");
        Ok(body.chargers)
    }
}
