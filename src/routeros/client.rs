use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::models::{Device, ResourceItem, ResourceKind};

use super::{ApiCall, RouterOsApi};

/// RouterOS v7 REST API client (basic auth against /rest)
pub struct RestClient {
    client: Client,
}

impl RestClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(true) // RouterOS ships a self-signed cert
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }

    fn base_url(&self, device: &Device) -> String {
        format!("https://{}:{}/rest", device.address, device.rest_port)
    }

    /// Resource collections map to fixed RouterOS paths
    fn resource_path(kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::Interfaces => "/interface",
            ResourceKind::Bridges => "/interface/bridge",
            ResourceKind::Vlans => "/interface/vlan",
        }
    }

    /// Extract the most specific failure detail the device offers
    async fn error_detail(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(detail) = v.get("detail").and_then(|d| d.as_str()) {
                return detail.to_string();
            }
            if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }
        if body.trim().is_empty() {
            format!("RouterOS API error {}", status)
        } else {
            format!("RouterOS API error {}: {}", status, body)
        }
    }
}

#[async_trait]
impl RouterOsApi for RestClient {
    async fn fetch_resources(
        &self,
        device: &Device,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceItem>> {
        let url = format!("{}{}", self.base_url(device), Self::resource_path(kind));
        let resp = self
            .client
            .get(&url)
            .basic_auth(&device.username, Some(&device.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!(Self::error_detail(resp).await));
        }

        let items: Vec<ResourceItem> = resp.json().await?;
        Ok(items)
    }

    async fn execute(&self, device: &Device, call: &ApiCall) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url(device), call.path);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&device.username, Some(&device.password))
            .json(&call.body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!(Self::error_detail(resp).await));
        }

        let body = resp.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }
}
