pub mod client;
pub mod commands;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Device, ResourceItem, ResourceKind};

/// One RouterOS API invocation: a command path plus its JSON parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub path: String,
    pub body: serde_json::Value,
}

impl ApiCall {
    pub fn new(path: &str, body: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            body,
        }
    }
}

/// Execution collaborator boundary. The real implementation talks to the
/// RouterOS REST API; tests substitute a mock.
#[async_trait]
pub trait RouterOsApi: Send + Sync {
    /// Fetch one resource collection from the device. Each kind is
    /// independently callable; one failing must not block the others.
    async fn fetch_resources(&self, device: &Device, kind: ResourceKind)
        -> Result<Vec<ResourceItem>>;

    /// Execute a single API call against the device
    async fn execute(&self, device: &Device, call: &ApiCall) -> Result<serde_json::Value>;
}
