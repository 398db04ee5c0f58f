use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::binder::{self, ValidationError};
use crate::catalog::{Catalog, CUSTOM_TEMPLATE};
use crate::execlog::{ExecutionLog, LogClass};
use crate::models::Device;
use crate::resources::ResourceCache;
use crate::routeros::{commands, RouterOsApi};

/// Classified result of submitting one template instantiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Success { message: String },
    Failure { detail: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }
}

/// Rejected before any network call; never logged
#[derive(Debug)]
pub enum SubmitError {
    UnknownTemplate(String),
    Validation(ValidationError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::UnknownTemplate(id) => write!(f, "unknown template: {}", id),
            SubmitError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<ValidationError> for SubmitError {
    fn from(e: ValidationError) -> Self {
        SubmitError::Validation(e)
    }
}

/// Submits resolved template instantiations to the device and classifies the
/// outcome. Every dispatch appends to the execution log; nothing propagates
/// past this boundary as a fault.
pub struct Dispatcher {
    api: Arc<dyn RouterOsApi>,
    cache: Arc<ResourceCache>,
    log: Arc<ExecutionLog>,
    catalog: Arc<Catalog>,
}

impl Dispatcher {
    pub fn new(
        api: Arc<dyn RouterOsApi>,
        cache: Arc<ResourceCache>,
        log: Arc<ExecutionLog>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            api,
            cache,
            log,
            catalog,
        }
    }

    /// Validated entry point for form submissions: derive defaults, assemble
    /// the payload, validate, then deploy. A validation failure
    /// short-circuits before any network call and is never logged.
    pub async fn submit(
        &self,
        device: &Device,
        template_id: &str,
        mut params: HashMap<String, String>,
    ) -> Result<DispatchOutcome, SubmitError> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| SubmitError::UnknownTemplate(template_id.to_string()))?;

        binder::derive_defaults(template_id, &mut params);
        let raw_command = if template_id == CUSTOM_TEMPLATE {
            params.get("command").cloned().unwrap_or_default()
        } else {
            String::new()
        };
        let payload = binder::build_payload(template, &params, &raw_command);
        binder::validate(template, &payload)?;

        Ok(self.deploy(device, template_id, &payload).await)
    }

    /// Execute the command plan for one (template, payload) pair. Transport
    /// and device errors are converted to a Failure outcome carrying the
    /// most specific detail available.
    pub async fn deploy(
        &self,
        device: &Device,
        template_id: &str,
        payload: &HashMap<String, String>,
    ) -> DispatchOutcome {
        let outcome = match self.run_plan(device, template_id, payload).await {
            Ok(message) => DispatchOutcome::Success { message },
            Err(e) => {
                let mut detail = e.to_string();
                if detail.trim().is_empty() {
                    detail = "transport error while contacting device".to_string();
                }
                DispatchOutcome::Failure { detail }
            }
        };

        match &outcome {
            DispatchOutcome::Success { message } => {
                self.log.append(LogClass::Success, message);
                // Template-name-keyed invalidation: interface/bridge changes
                // may have created resources the selects should now offer
                if template_id.contains("interface") || template_id.contains("bridge") {
                    self.cache.refresh_interfaces(device.id).await;
                }
            }
            DispatchOutcome::Failure { detail } => {
                tracing::warn!(
                    "Deploy of {} to device {} failed: {}",
                    template_id,
                    device.id,
                    detail
                );
                self.log.append(LogClass::Error, detail);
            }
        }

        outcome
    }

    async fn run_plan(
        &self,
        device: &Device,
        template_id: &str,
        payload: &HashMap<String, String>,
    ) -> anyhow::Result<String> {
        let plan = commands::build_plan(template_id, payload)?;
        for call in &plan {
            self.api.execute(device, call).await?;
        }
        Ok(format!(
            "Applied {} ({} command{})",
            template_id,
            plan.len(),
            if plan.len() == 1 { "" } else { "s" }
        ))
    }
}
