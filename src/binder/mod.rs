use std::collections::HashMap;

use crate::catalog::{FieldKind, FieldSpec, TemplateDefinition, CUSTOM_TEMPLATE};
use crate::models::ResourceSnapshot;

/// Well-known resolvers injected by the lan_setup cross-field rule
pub const DEFAULT_DNS: &str = "8.8.8.8,1.1.1.1";

/// A required field resolved to empty. Never reaches the execution log;
/// surfaced inline at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
}

impl ValidationError {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}' is required", self.field)
    }
}

impl std::error::Error for ValidationError {}

/// Value to display/submit for a field: user edit wins, then the field
/// default, then empty
pub fn resolve_value(field: &FieldSpec, params: &HashMap<String, String>) -> String {
    if let Some(v) = params.get(&field.name) {
        return v.clone();
    }
    field.default.clone().unwrap_or_default()
}

/// Selectable options for a field. Source-bound selects read the snapshot
/// (empty while loading or after a failed fetch); otherwise the static list.
pub fn resolve_options(field: &FieldSpec, snapshot: &ResourceSnapshot) -> Vec<String> {
    match &field.kind {
        FieldKind::Select {
            source: Some(kind), ..
        } => snapshot
            .collection(*kind)
            .iter()
            .map(|r| r.name.clone())
            .collect(),
        FieldKind::Select { options, .. } => options.clone(),
        FieldKind::Text { .. } => Vec::new(),
    }
}

/// The single cross-field inference rule: lan_setup with an interface chosen
/// and no DNS override gets the well-known resolvers. No other field may
/// read another field's value.
pub fn derive_defaults(template_id: &str, params: &mut HashMap<String, String>) {
    if template_id != "lan_setup" {
        return;
    }
    let has_interface = params.get("Interface").is_some_and(|v| !v.is_empty());
    let has_dns = params.get("DNS").is_some_and(|v| !v.is_empty());
    if has_interface && !has_dns {
        params.insert("DNS".to_string(), DEFAULT_DNS.to_string());
    }
}

/// Assemble the submission payload: the custom template carries a single raw
/// command, everything else carries every field's resolved value keyed by
/// field name
pub fn build_payload(
    template: &TemplateDefinition,
    params: &HashMap<String, String>,
    raw_command: &str,
) -> HashMap<String, String> {
    if template.id == CUSTOM_TEMPLATE {
        let mut payload = HashMap::new();
        payload.insert("command".to_string(), raw_command.to_string());
        return payload;
    }
    template
        .fields
        .iter()
        .map(|f| (f.name.clone(), resolve_value(f, params)))
        .collect()
}

/// Every field is mandatory; the custom template requires a non-empty
/// command. Checked before any network call.
pub fn validate(
    template: &TemplateDefinition,
    payload: &HashMap<String, String>,
) -> Result<(), ValidationError> {
    if template.id == CUSTOM_TEMPLATE {
        if payload.get("command").map_or(true, |c| c.trim().is_empty()) {
            return Err(ValidationError::new("command"));
        }
        return Ok(());
    }
    for field in &template.fields {
        if payload.get(&field.name).map_or(true, |v| v.trim().is_empty()) {
            return Err(ValidationError::new(&field.name));
        }
    }
    Ok(())
}
