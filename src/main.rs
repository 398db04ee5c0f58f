mod actions;
mod binder;
mod catalog;
mod config;
mod dispatch;
mod execlog;
mod handlers;
mod models;
mod registry;
mod resources;
mod router;
mod routeros;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actions::ActionCatalog;
use catalog::Catalog;
use config::Config;
use dispatch::Dispatcher;
use execlog::ExecutionLog;
use registry::{DeviceRegistry, FileRegistry};
use resources::ResourceCache;
use routeros::{client::RestClient, RouterOsApi};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub registry: Arc<dyn DeviceRegistry>,
    pub api: Arc<dyn RouterOsApi>,
    pub cache: Arc<ResourceCache>,
    pub log: Arc<ExecutionLog>,
    pub catalog: Arc<Catalog>,
    pub actions: ActionCatalog,
    pub dispatcher: Dispatcher,
    deploy_in_flight: AtomicBool,
}

impl AppState {
    /// Claim the single deploy slot; None if a deploy or action sequence is
    /// already running. The slot is held until the returned guard drops, so a
    /// request future cancelled mid-deploy still releases it.
    pub fn begin_deploy(self: &Arc<Self>) -> Option<DeployGuard> {
        self.deploy_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| DeployGuard {
                state: self.clone(),
            })
    }
}

/// Releases the deploy slot on drop
pub struct DeployGuard {
    state: Arc<AppState>,
}

impl Drop for DeployGuard {
    fn drop(&mut self) {
        self.state.deploy_in_flight.store(false, Ordering::SeqCst);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "config_weaver=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting ConfigWeaver Server");
    tracing::info!("Devices file: {}", cfg.devices_path);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Load device registry
    let registry: Arc<dyn DeviceRegistry> = Arc::new(FileRegistry::load(&cfg.devices_path)?);
    let device_count = registry.list_devices().await?.len();
    tracing::info!("Device registry loaded ({} devices)", device_count);

    // RouterOS REST client
    let api: Arc<dyn RouterOsApi> = Arc::new(RestClient::new(cfg.routeros_timeout_secs)?);

    // Core components
    let cache = Arc::new(ResourceCache::new(api.clone(), registry.clone()));
    let log = Arc::new(ExecutionLog::new());
    let catalog = Arc::new(Catalog::new());
    let dispatcher = Dispatcher::new(api.clone(), cache.clone(), log.clone(), catalog.clone());

    // Create app state
    let state = Arc::new(AppState {
        config: cfg,
        registry,
        api,
        cache,
        log,
        catalog,
        actions: ActionCatalog::new(),
        dispatcher,
        deploy_in_flight: AtomicBool::new(false),
    });

    // Build router
    let frontend_dir = state.config.frontend_dir.clone();
    let app = router::build(state.clone(), &frontend_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&state.config.listen_addr).await?;
    tracing::info!("ConfigWeaver listening on {}", state.config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ConfigWeaver shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeployRequest, Device, ResourceItem, ResourceKind};
    use crate::routeros::ApiCall;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::extract::State;
    use axum::Json;
    use std::time::Duration;

    // Never completes an execute call, like a device that stopped answering
    struct StalledApi;

    #[async_trait]
    impl RouterOsApi for StalledApi {
        async fn fetch_resources(
            &self,
            _device: &Device,
            _kind: ResourceKind,
        ) -> Result<Vec<ResourceItem>> {
            Ok(Vec::new())
        }

        async fn execute(&self, _device: &Device, _call: &ApiCall) -> Result<serde_json::Value> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

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

    fn test_state(api: Arc<dyn RouterOsApi>) -> Arc<AppState> {
        let registry: Arc<dyn DeviceRegistry> =
            Arc::new(FileRegistry::with_devices(vec![device(1)]));
        let cache = Arc::new(ResourceCache::new(api.clone(), registry.clone()));
        let log = Arc::new(ExecutionLog::new());
        let catalog = Arc::new(Catalog::new());
        let dispatcher = Dispatcher::new(api.clone(), cache.clone(), log.clone(), catalog.clone());
        Arc::new(AppState {
            config: Config::load(),
            registry,
            api,
            cache,
            log,
            catalog,
            actions: ActionCatalog::new(),
            dispatcher,
            deploy_in_flight: AtomicBool::new(false),
        })
    }

    #[tokio::test]
    async fn test_deploy_slot_exclusive_until_guard_drops() {
        let state = test_state(Arc::new(StalledApi));
        let guard = state.begin_deploy();
        assert!(guard.is_some());
        assert!(state.begin_deploy().is_none());
        drop(guard);
        assert!(state.begin_deploy().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_deploy_releases_slot() {
        let state = test_state(Arc::new(StalledApi));
        let req = DeployRequest {
            device_id: 1,
            template_name: "bridge_add".into(),
            params: [("Bridge Name".to_string(), "br0".to_string())]
                .into_iter()
                .collect(),
        };

        // Dropping the handler future mirrors a client disconnect mid-deploy
        let fut = handlers::configuration::deploy_configuration(State(state.clone()), Json(req));
        let result = tokio::time::timeout(Duration::from_millis(50), fut).await;
        assert!(result.is_err());

        assert!(state.begin_deploy().is_some());
    }
}
