use axum::{extract::State, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Device, QuickSetupRequest, QuickSetupResponse};
use crate::AppState;

use super::ApiError;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// One-click onboarding for a fresh device: SNMP, service hardening, NTP,
/// optional firewall. Each step is best-effort; failures are collected and
/// reported, not fatal.
pub async fn quick_setup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuickSetupRequest>,
) -> Result<Json<QuickSetupResponse>, ApiError> {
    let device = state
        .registry
        .get_device(req.device_id)
        .await?
        .ok_or_else(|| ApiError::not_found("device"))?;

    let _deploy = state
        .begin_deploy()
        .ok_or_else(|| ApiError::conflict("a deployment is already in progress"))?;

    let mut steps_completed = Vec::new();
    let mut errors = Vec::new();
    let mut requested = 0;

    if req.enable_snmp {
        requested += 1;
        match deploy_step(
            &state,
            &device,
            "enable_snmp",
            params(&[("Community", &req.snmp_community)]),
        )
        .await
        {
            Ok(()) => steps_completed.push("SNMP enabled".to_string()),
            Err(e) => errors.push(format!("SNMP setup failed: {}", e)),
        }
    }

    if req.secure_services {
        requested += 1;
        let telnet = deploy_step(
            &state,
            &device,
            "service_toggle",
            params(&[
                ("Service Name", "telnet"),
                ("State (enable/disable)", "disable"),
                ("Port", "23"),
            ]),
        )
        .await;
        let ssh = deploy_step(
            &state,
            &device,
            "service_toggle",
            params(&[
                ("Service Name", "ssh"),
                ("State (enable/disable)", "enable"),
                ("Port", "22"),
            ]),
        )
        .await;
        let mut secured = true;
        if let Err(e) = telnet {
            secured = false;
            errors.push(format!("Telnet disable failed: {}", e));
        }
        if let Err(e) = ssh {
            secured = false;
            errors.push(format!("SSH enable failed: {}", e));
        }
        if secured {
            steps_completed.push("Services secured (telnet disabled, SSH enabled)".to_string());
        }
    }

    if req.setup_ntp {
        requested += 1;
        match deploy_step(
            &state,
            &device,
            "system_ntp_client",
            params(&[
                ("Primary NTP Server", &req.ntp_primary),
                ("Secondary NTP Server", &req.ntp_secondary),
                ("Enabled", "yes"),
            ]),
        )
        .await
        {
            Ok(()) => steps_completed.push(format!("NTP configured ({})", req.ntp_primary)),
            Err(e) => errors.push(format!("NTP setup failed: {}", e)),
        }
    }

    if req.basic_firewall {
        requested += 1;
        match deploy_step(
            &state,
            &device,
            "firewall_filter_add",
            params(&[
                ("Chain", "input"),
                ("Protocol", "tcp"),
                ("Dst Port", ""),
                ("Action", "accept"),
                ("Src Address", ""),
                ("Comment", "Accept established"),
            ]),
        )
        .await
        {
            Ok(()) => steps_completed.push("Basic firewall rules added".to_string()),
            Err(e) => errors.push(format!("Firewall setup failed: {}", e)),
        }
    }

    let success = !steps_completed.is_empty();
    let message = format!(
        "Quick setup completed: {}/{} steps",
        steps_completed.len(),
        requested
    );

    Ok(Json(QuickSetupResponse {
        success,
        message,
        steps_completed,
        errors,
    }))
}

async fn deploy_step(
    state: &AppState,
    device: &Device,
    template_id: &str,
    params: HashMap<String, String>,
) -> Result<(), String> {
    match state.dispatcher.deploy(device, template_id, &params).await {
        crate::dispatch::DispatchOutcome::Success { .. } => Ok(()),
        crate::dispatch::DispatchOutcome::Failure { detail } => Err(detail),
    }
}
