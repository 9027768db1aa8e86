use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{DomainError, DomainResult, ServiceRegistry};

/// Registry answering from a fixed table, usually the `[registry.values]`
/// section of the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    values: HashMap<String, String>,
}

impl StaticRegistry {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn lookup(&self, key: &str) -> DomainResult<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::Registry(format!("no value for key '{}'", key)))
    }
}
