use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::models::{Device, ResourceItem, ResourceKind, ResourceSnapshot};
use crate::registry::DeviceRegistry;
use crate::routeros::RouterOsApi;

struct Inner {
    device_id: Option<i64>,
    generation: u64,
    remaining: u32,
    interfaces: Vec<ResourceItem>,
    bridges: Vec<ResourceItem>,
    vlans: Vec<ResourceItem>,
}

impl Inner {
    fn clear_collections(&mut self) {
        self.interfaces.clear();
        self.bridges.clear();
        self.vlans.clear();
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceItem> {
        match kind {
            ResourceKind::Interfaces => &mut self.interfaces,
            ResourceKind::Bridges => &mut self.bridges,
            ResourceKind::Vlans => &mut self.vlans,
        }
    }
}

/// Per-device snapshot of discoverable resources, tied to the active
/// selection.
///
/// Selecting a device clears the snapshot synchronously, then issues three
/// independent fetches. Each fetch captures the generation at start and
/// re-checks it on completion, so a late response for a superseded selection
/// is discarded rather than attributed to the wrong device. One kind failing
/// never blocks the others.
pub struct ResourceCache {
    api: Arc<dyn RouterOsApi>,
    registry: Arc<dyn DeviceRegistry>,
    inner: Mutex<Inner>,
}

impl ResourceCache {
    pub fn new(api: Arc<dyn RouterOsApi>, registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            api,
            registry,
            inner: Mutex::new(Inner {
                device_id: None,
                generation: 0,
                remaining: 0,
                interfaces: Vec::new(),
                bridges: Vec::new(),
                vlans: Vec::new(),
            }),
        }
    }

    /// Select a device: invalidate the snapshot, then fetch all three
    /// resource kinds concurrently
    pub async fn select(self: &Arc<Self>, device_id: i64) -> Result<()> {
        let device = self
            .registry
            .get_device(device_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("device not found: {}", device_id))?;

        let generation = {
            let mut inner = self.inner.lock().expect("resource cache poisoned");
            inner.generation += 1;
            inner.device_id = Some(device_id);
            inner.clear_collections();
            inner.remaining = 3;
            inner.generation
        };

        for kind in [
            ResourceKind::Interfaces,
            ResourceKind::Bridges,
            ResourceKind::Vlans,
        ] {
            let cache = self.clone();
            let device = device.clone();
            tokio::spawn(async move {
                let result = cache.api.fetch_resources(&device, kind).await;
                let mut inner = cache.inner.lock().expect("resource cache poisoned");
                if inner.generation != generation {
                    // Superseded selection; drop the response
                    return;
                }
                match result {
                    Ok(items) => *inner.slot_mut(kind) = items,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to fetch {} for device {}: {}",
                            kind.as_str(),
                            device.id,
                            e
                        );
                    }
                }
                inner.remaining -= 1;
            });
        }

        Ok(())
    }

    /// Clear the selection; no fetches are issued
    pub fn select_none(&self) {
        let mut inner = self.inner.lock().expect("resource cache poisoned");
        inner.generation += 1;
        inner.device_id = None;
        inner.clear_collections();
        inner.remaining = 0;
    }

    /// True while any fetch for the current selection is outstanding
    pub fn is_loading(&self) -> bool {
        self.inner.lock().expect("resource cache poisoned").remaining > 0
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        let inner = self.inner.lock().expect("resource cache poisoned");
        ResourceSnapshot {
            device_id: inner.device_id,
            interfaces: inner.interfaces.clone(),
            bridges: inner.bridges.clone(),
            vlans: inner.vlans.clone(),
        }
    }

    /// Refetch only the interfaces slice, so selects reflect newly created
    /// resources after a deploy. No-op unless the device is still selected.
    pub async fn refresh_interfaces(&self, device_id: i64) {
        let generation = {
            let inner = self.inner.lock().expect("resource cache poisoned");
            if inner.device_id != Some(device_id) {
                return;
            }
            inner.generation
        };

        let device = match self.registry.get_device(device_id).await {
            Ok(Some(d)) => d,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Interface refresh lookup failed for {}: {}", device_id, e);
                return;
            }
        };

        match self
            .api
            .fetch_resources(&device, ResourceKind::Interfaces)
            .await
        {
            Ok(items) => {
                let mut inner = self.inner.lock().expect("resource cache poisoned");
                if inner.generation == generation {
                    inner.interfaces = items;
                }
            }
            Err(e) => {
                tracing::warn!("Interface refresh failed for device {}: {}", device_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Device;
    use crate::registry::FileRegistry;
    use crate::routeros::ApiCall;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn device(id: i64) -> Device {
        Device {
            id,
            name: format!("router-{}", id),
            address: format!("10.0.0.{}", id),
            username: "admin".into(),
            password: "secret".into(),
            rest_port: 443,
        }
    }

    /// Mock API: per-device resource data, optional per-device gate that
    /// holds responses until released, per-kind failure injection
    struct MockApi {
        data: HashMap<i64, Vec<ResourceItem>>,
        gates: HashMap<i64, Arc<Notify>>,
        fail_kinds: Vec<ResourceKind>,
        fetches: AtomicUsize,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                data: HashMap::new(),
                gates: HashMap::new(),
                fail_kinds: Vec::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn with_data(mut self, device_id: i64, names: &[&str]) -> Self {
            self.data
                .insert(device_id, names.iter().map(|n| ResourceItem::named(n)).collect());
            self
        }

        fn with_gate(mut self, device_id: i64, gate: Arc<Notify>) -> Self {
            self.gates.insert(device_id, gate);
            self
        }
    }

    #[async_trait]
    impl RouterOsApi for MockApi {
        async fn fetch_resources(
            &self,
            device: &Device,
            kind: ResourceKind,
        ) -> Result<Vec<ResourceItem>> {
            if let Some(gate) = self.gates.get(&device.id) {
                gate.notified().await;
            }
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_kinds.contains(&kind) {
                anyhow::bail!("connection refused");
            }
            Ok(self.data.get(&device.id).cloned().unwrap_or_default())
        }

        async fn execute(&self, _device: &Device, _call: &ApiCall) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    async fn wait_settled(cache: &ResourceCache) {
        for _ in 0..100 {
            if !cache.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("cache never settled");
    }

    fn build_cache(api: MockApi, devices: Vec<Device>) -> Arc<ResourceCache> {
        let registry = Arc::new(FileRegistry::with_devices(devices));
        Arc::new(ResourceCache::new(Arc::new(api), registry))
    }

    #[tokio::test]
    async fn test_select_populates_all_kinds() {
        let api = MockApi::new().with_data(1, &["ether1", "ether2"]);
        let cache = build_cache(api, vec![device(1)]);
        cache.select(1).await.unwrap();
        wait_settled(&cache).await;

        let snap = cache.snapshot();
        assert_eq!(snap.device_id, Some(1));
        assert_eq!(snap.interfaces.len(), 2);
        assert_eq!(snap.bridges.len(), 2);
        assert_eq!(snap.vlans.len(), 2);
    }

    #[tokio::test]
    async fn test_select_none_clears_synchronously() {
        let api = MockApi::new().with_data(1, &["ether1"]);
        let cache = build_cache(api, vec![device(1)]);
        cache.select(1).await.unwrap();
        wait_settled(&cache).await;

        cache.select_none();
        let snap = cache.snapshot();
        assert_eq!(snap.device_id, None);
        assert!(snap.interfaces.is_empty());
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_stale_response_discarded_on_reselect() {
        let gate_a = Arc::new(Notify::new());
        let api = MockApi::new()
            .with_data(1, &["a-ether"])
            .with_data(2, &["b-ether"])
            .with_gate(1, gate_a.clone());
        let cache = build_cache(api, vec![device(1), device(2)]);

        // Device A's fetches are gated; switch to B before they resolve
        cache.select(1).await.unwrap();
        cache.select(2).await.unwrap();
        wait_settled(&cache).await;

        // Release A's late responses and give them a chance to land
        gate_a.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let snap = cache.snapshot();
        assert_eq!(snap.device_id, Some(2));
        assert_eq!(snap.interfaces.len(), 1);
        assert_eq!(snap.interfaces[0].name, "b-ether");
    }

    #[tokio::test]
    async fn test_partial_failure_populates_other_slots() {
        let mut api = MockApi::new().with_data(1, &["ether1"]);
        api.fail_kinds.push(ResourceKind::Vlans);
        let cache = build_cache(api, vec![device(1)]);
        cache.select(1).await.unwrap();
        wait_settled(&cache).await;

        let snap = cache.snapshot();
        assert_eq!(snap.interfaces.len(), 1);
        assert_eq!(snap.bridges.len(), 1);
        assert!(snap.vlans.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_interfaces_noop_for_unselected_device() {
        let api = MockApi::new().with_data(1, &["ether1"]).with_data(2, &["other"]);
        let cache = build_cache(api, vec![device(1), device(2)]);
        cache.select(1).await.unwrap();
        wait_settled(&cache).await;

        cache.refresh_interfaces(2).await;
        let snap = cache.snapshot();
        assert_eq!(snap.interfaces[0].name, "ether1");
    }

    #[tokio::test]
    async fn test_select_unknown_device_fails() {
        let cache = build_cache(MockApi::new(), vec![]);
        assert!(cache.select(42).await.is_err());
    }
}
