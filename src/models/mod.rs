use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Device represents a managed RouterOS device.
///
/// Devices are owned by the registry collaborator; this service only reads
/// them. Credentials are never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default = "default_rest_port")]
    pub rest_port: u16,
}

fn default_rest_port() -> u16 {
    443
}

/// The three discoverable resource collections on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Interfaces,
    Bridges,
    Vlans,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Interfaces => "interfaces",
            ResourceKind::Bridges => "bridges",
            ResourceKind::Vlans => "vlans",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interfaces" => Some(ResourceKind::Interfaces),
            "bridges" => Some(ResourceKind::Bridges),
            "vlans" => Some(ResourceKind::Vlans),
            _ => None,
        }
    }
}

/// A single discovered resource (interface, bridge, or VLAN).
/// The device returns more attributes than we model; everything beyond the
/// name rides along untyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceItem {
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ResourceItem {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extra: HashMap::new(),
        }
    }
}

/// Snapshot of the resource inventory for the currently selected device
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceSnapshot {
    pub device_id: Option<i64>,
    pub interfaces: Vec<ResourceItem>,
    pub bridges: Vec<ResourceItem>,
    pub vlans: Vec<ResourceItem>,
}

impl ResourceSnapshot {
    pub fn collection(&self, kind: ResourceKind) -> &[ResourceItem] {
        match kind {
            ResourceKind::Interfaces => &self.interfaces,
            ResourceKind::Bridges => &self.bridges,
            ResourceKind::Vlans => &self.vlans,
        }
    }
}

/// Request body for POST /api/config/deploy (mirrors the frontend payload)
#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub device_id: i64,
    pub template_name: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Response for a deploy request
#[derive(Debug, Clone, Serialize)]
pub struct DeployResponse {
    pub status: String,
    pub message: String,
}

/// Request body for selecting (or clearing) the active device
#[derive(Debug, Clone, Deserialize)]
pub struct SelectDeviceRequest {
    pub device_id: Option<i64>,
}

/// Current resource inventory state for the active selection
#[derive(Debug, Clone, Serialize)]
pub struct ResourceStateResponse {
    pub loading: bool,
    #[serde(flatten)]
    pub snapshot: ResourceSnapshot,
}

/// Request body for running a quick action
#[derive(Debug, Clone, Deserialize)]
pub struct RunActionRequest {
    pub device_id: i64,
}

/// Quick action metadata for the list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ActionSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: usize,
}

/// Request body for the manual rollback marker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RollbackRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// One-click guided setup request (SNMP, service hardening, NTP, firewall)
#[derive(Debug, Clone, Deserialize)]
pub struct QuickSetupRequest {
    pub device_id: i64,
    #[serde(default = "default_true")]
    pub enable_snmp: bool,
    #[serde(default = "default_snmp_community")]
    pub snmp_community: String,
    #[serde(default = "default_true")]
    pub secure_services: bool,
    #[serde(default = "default_true")]
    pub setup_ntp: bool,
    #[serde(default = "default_ntp_primary")]
    pub ntp_primary: String,
    #[serde(default = "default_ntp_secondary")]
    pub ntp_secondary: String,
    #[serde(default)]
    pub basic_firewall: bool,
}

fn default_true() -> bool {
    true
}

fn default_snmp_community() -> String {
    "public".to_string()
}

fn default_ntp_primary() -> String {
    "time.google.com".to_string()
}

fn default_ntp_secondary() -> String {
    "time.cloudflare.com".to_string()
}

/// Guided setup outcome: which steps landed, which failed
#[derive(Debug, Clone, Serialize)]
pub struct QuickSetupResponse {
    pub success: bool,
    pub message: String,
    pub steps_completed: Vec<String>,
    pub errors: Vec<String>,
}
