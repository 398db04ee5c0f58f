use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::Device;

/// Device registry collaborator. Device CRUD lives elsewhere; this service
/// only resolves identifiers to connection details.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<Device>>;
    async fn get_device(&self, id: i64) -> Result<Option<Device>>;
}

/// Registry backed by a JSON file read once at startup
pub struct FileRegistry {
    devices: Vec<Device>,
}

impl FileRegistry {
    pub fn load(path: &str) -> Result<Self> {
        let devices = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data)
                .with_context(|| format!("invalid devices file: {}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Devices file {} not found - starting with no devices", path);
                Vec::new()
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path)),
        };
        Ok(Self { devices })
    }

    #[cfg(test)]
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl DeviceRegistry for FileRegistry {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }

    async fn get_device(&self, id: i64) -> Result<Option<Device>> {
        Ok(self.devices.iter().find(|d| d.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: i64, name: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            address: "10.0.0.1".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            rest_port: 443,
        }
    }

    #[tokio::test]
    async fn test_get_device_by_id() {
        let reg = FileRegistry::with_devices(vec![device(1, "core"), device(2, "edge")]);
        let found = reg.get_device(2).await.unwrap().unwrap();
        assert_eq!(found.name, "edge");
        assert!(reg.get_device(9).await.unwrap().is_none());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let reg = FileRegistry::load("/nonexistent/devices.json").unwrap();
        assert!(reg.devices.is_empty());
    }
}
