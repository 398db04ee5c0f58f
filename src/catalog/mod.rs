use serde::Serialize;

use crate::models::ResourceKind;

/// Template id whose payload is a single raw command string instead of
/// named parameters
pub const CUSTOM_TEMPLATE: &str = "custom";

/// Field kind: free text, or a select whose options come from a static list
/// or from the live resource inventory of the selected device
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Select {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<ResourceKind>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
}

/// One parameter slot of a template
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text { placeholder: None },
            default: None,
        }
    }

    pub fn text_with_placeholder(name: &str, placeholder: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text {
                placeholder: Some(placeholder.to_string()),
            },
            default: None,
        }
    }

    pub fn text_with_default(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text { placeholder: None },
            default: Some(default.to_string()),
        }
    }

    pub fn select_from(name: &str, source: ResourceKind) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Select {
                source: Some(source),
                options: Vec::new(),
            },
            default: None,
        }
    }

    pub fn select_options(name: &str, options: &[&str], default: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Select {
                source: None,
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            default: default.map(|d| d.to_string()),
        }
    }
}

/// A declarative configuration template: category for grouping plus an
/// ordered field schema
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDefinition {
    pub id: String,
    pub category: String,
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl TemplateDefinition {
    fn new(id: &str, category: &str, name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            fields,
        }
    }
}

/// Static template catalog. Pure lookup, no I/O; adding or removing a
/// template is an edit here, not a runtime operation.
pub struct Catalog {
    templates: Vec<TemplateDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Categories in first-seen order of the definition list
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for t in &self.templates {
            if !out.contains(&t.category) {
                out.push(t.category.clone());
            }
        }
        out
    }

    /// Templates of one category, in declared order
    pub fn templates_in(&self, category: &str) -> Vec<&TemplateDefinition> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[TemplateDefinition] {
        &self.templates
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_templates() -> Vec<TemplateDefinition> {
    use FieldSpec as F;
    use ResourceKind::*;

    vec![
        // --- Quick Actions (workflow composites) ---
        TemplateDefinition::new(
            "lan_setup",
            "Quick Actions",
            "LAN Setup (IP + DHCP + NAT)",
            vec![
                F::select_from("Interface", Interfaces),
                F::text_with_placeholder("IP Address", "192.168.88.1/24"),
                F::select_options("DHCP Server", &["yes", "no"], Some("yes")),
                F::text_with_default("DNS", "8.8.8.8,1.1.1.1"),
            ],
        ),
        TemplateDefinition::new(
            "wan_setup",
            "Quick Actions",
            "WAN Setup (DHCP Client + Firewall)",
            vec![
                F::select_from("Interface", Interfaces),
                F::select_options("Firewall", &["yes", "no"], Some("yes")),
            ],
        ),
        // --- Bridge ---
        TemplateDefinition::new(
            "bridge_add",
            "Bridge",
            "Add Bridge",
            vec![F::text("Bridge Name")],
        ),
        TemplateDefinition::new(
            "bridge_add_port",
            "Bridge",
            "Add Port to Bridge",
            vec![
                F::select_from("Bridge Name", Bridges),
                F::select_from("Interface", Interfaces),
            ],
        ),
        // --- VLAN ---
        TemplateDefinition::new(
            "vlan_add",
            "VLAN",
            "Add VLAN Interface",
            vec![
                F::text("Name"),
                F::text_with_placeholder("VLAN ID", "100"),
                F::select_from("Interface", Interfaces),
            ],
        ),
        // --- IP ---
        TemplateDefinition::new(
            "ip_address_add",
            "IP",
            "Add IP Address",
            vec![
                F::select_from("Interface", Interfaces),
                F::text_with_placeholder("IP Address", "10.0.0.1/24"),
            ],
        ),
        TemplateDefinition::new(
            "dns_config",
            "IP",
            "DNS Configuration",
            vec![
                F::text_with_default("Primary DNS", "8.8.8.8"),
                F::text_with_default("Secondary DNS", "1.1.1.1"),
                F::select_options("Allow Remote Requests", &["yes", "no"], Some("yes")),
            ],
        ),
        // --- NAT ---
        TemplateDefinition::new(
            "nat_masquerade",
            "NAT",
            "NAT Masquerade",
            vec![F::select_from("Out Interface", Interfaces)],
        ),
        TemplateDefinition::new(
            "nat_dst",
            "NAT",
            "Port Forward (DstNAT)",
            vec![
                F::select_options("Protocol", &["tcp", "udp"], Some("tcp")),
                F::text("Dst Port"),
                F::text("To Address"),
                F::text("To Port"),
            ],
        ),
        // --- Firewall ---
        TemplateDefinition::new(
            "firewall_filter_add",
            "Firewall",
            "Add Filter Rule",
            vec![
                F::select_options("Chain", &["input", "forward", "output"], Some("input")),
                F::select_options("Protocol", &["tcp", "udp", "icmp"], Some("tcp")),
                F::text("Dst Port"),
                F::select_options("Action", &["accept", "drop", "reject"], Some("accept")),
                F::text("Src Address"),
                F::text("Comment"),
            ],
        ),
        TemplateDefinition::new(
            "block_website",
            "Firewall",
            "Block Website (L7)",
            vec![F::text_with_placeholder("URL", "example.com")],
        ),
        // --- System ---
        TemplateDefinition::new(
            "service_toggle",
            "System",
            "Enable/Disable Service",
            vec![
                F::select_options(
                    "Service Name",
                    &["telnet", "ssh", "ftp", "www", "winbox", "api"],
                    None,
                ),
                F::select_options("State (enable/disable)", &["enable", "disable"], None),
                F::text("Port"),
            ],
        ),
        TemplateDefinition::new(
            "system_backup",
            "System",
            "Create Backup",
            vec![F::text_with_placeholder("Backup Name", "backup-2024-01-01")],
        ),
        TemplateDefinition::new(
            "system_ntp_client",
            "System",
            "NTP Client",
            vec![
                F::text_with_default("Primary NTP Server", "time.google.com"),
                F::text_with_default("Secondary NTP Server", "time.cloudflare.com"),
                F::select_options("Enabled", &["yes", "no"], Some("yes")),
            ],
        ),
        TemplateDefinition::new(
            "enable_snmp",
            "System",
            "Enable SNMP",
            vec![F::text_with_default("Community", "public")],
        ),
        // --- Custom ---
        TemplateDefinition::new("custom", "Custom", "Custom Command", vec![]),
    ]
}
