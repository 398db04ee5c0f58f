use anyhow::{bail, Result};
use serde_json::json;
use std::collections::HashMap;

use super::ApiCall;

/// Build the ordered list of RouterOS API calls for a template submission.
/// Multi-call plans run sequentially; rule order matters for firewall paths.
pub fn build_plan(template_id: &str, payload: &HashMap<String, String>) -> Result<Vec<ApiCall>> {
    let p = |name: &str| -> String { payload.get(name).cloned().unwrap_or_default() };

    let plan = match template_id {
        "bridge_add" => vec![ApiCall::new(
            "/interface/bridge/add",
            json!({ "name": p("Bridge Name") }),
        )],
        "bridge_add_port" => vec![ApiCall::new(
            "/interface/bridge/port/add",
            json!({ "bridge": p("Bridge Name"), "interface": p("Interface") }),
        )],
        "vlan_add" => vec![ApiCall::new(
            "/interface/vlan/add",
            json!({
                "name": p("Name"),
                "vlan-id": p("VLAN ID"),
                "interface": p("Interface"),
            }),
        )],
        "ip_address_add" => vec![ApiCall::new(
            "/ip/address/add",
            json!({ "address": p("IP Address"), "interface": p("Interface") }),
        )],
        "dns_config" => vec![ApiCall::new(
            "/ip/dns/set",
            json!({
                "servers": format!("{},{}", p("Primary DNS"), p("Secondary DNS")),
                "allow-remote-requests": p("Allow Remote Requests"),
            }),
        )],
        "nat_masquerade" => vec![ApiCall::new(
            "/ip/firewall/nat/add",
            json!({
                "chain": "srcnat",
                "action": "masquerade",
                "out-interface": p("Out Interface"),
            }),
        )],
        "nat_dst" => vec![ApiCall::new(
            "/ip/firewall/nat/add",
            json!({
                "chain": "dstnat",
                "action": "dst-nat",
                "protocol": p("Protocol"),
                "dst-port": p("Dst Port"),
                "to-addresses": p("To Address"),
                "to-ports": p("To Port"),
            }),
        )],
        "lan_setup" => {
            let iface = p("Interface");
            let mut calls = vec![ApiCall::new(
                "/ip/address/add",
                json!({ "address": p("IP Address"), "interface": &iface }),
            )];
            if p("DHCP Server") == "yes" {
                calls.push(ApiCall::new(
                    "/ip/dhcp-server/add",
                    json!({ "name": format!("dhcp-{}", iface), "interface": &iface }),
                ));
            }
            calls.push(ApiCall::new(
                "/ip/dns/set",
                json!({ "servers": p("DNS"), "allow-remote-requests": "yes" }),
            ));
            calls
        }
        "wan_setup" => {
            let iface = p("Interface");
            let mut calls = vec![ApiCall::new(
                "/ip/dhcp-client/add",
                json!({ "interface": &iface }),
            )];
            if p("Firewall") == "yes" {
                // Order matters: accept rules before the drop
                calls.push(ApiCall::new(
                    "/ip/firewall/filter/add",
                    json!({
                        "chain": "input",
                        "in-interface": &iface,
                        "connection-state": "established,related",
                        "action": "accept",
                    }),
                ));
                calls.push(ApiCall::new(
                    "/ip/firewall/filter/add",
                    json!({
                        "chain": "input",
                        "in-interface": &iface,
                        "connection-state": "invalid",
                        "action": "drop",
                    }),
                ));
            }
            calls
        }
        "firewall_filter_add" => {
            let mut body = serde_json::Map::new();
            body.insert("chain".into(), json!(p("Chain")));
            body.insert("protocol".into(), json!(p("Protocol")));
            body.insert("action".into(), json!(p("Action")));
            // Optional attributes are omitted when blank
            for (param, attr) in [
                ("Dst Port", "dst-port"),
                ("Src Address", "src-address"),
                ("Comment", "comment"),
            ] {
                let v = p(param);
                if !v.is_empty() {
                    body.insert(attr.into(), json!(v));
                }
            }
            vec![ApiCall::new(
                "/ip/firewall/filter/add",
                serde_json::Value::Object(body),
            )]
        }
        "block_website" => {
            let url = p("URL");
            let proto = format!("block_{}", url);
            vec![
                ApiCall::new(
                    "/ip/firewall/layer7-protocol/add",
                    json!({ "name": &proto, "regexp": format!("^{}.*$", url) }),
                ),
                ApiCall::new(
                    "/ip/firewall/filter/add",
                    json!({
                        "chain": "forward",
                        "action": "drop",
                        "layer7-protocol": &proto,
                        "comment": format!("Blocked by ConfigWeaver: {}", url),
                    }),
                ),
            ]
        }
        "service_toggle" => {
            let disabled = if p("State (enable/disable)") == "disable" {
                "yes"
            } else {
                "no"
            };
            vec![ApiCall::new(
                "/ip/service/set",
                json!({
                    "numbers": p("Service Name"),
                    "disabled": disabled,
                    "port": p("Port"),
                }),
            )]
        }
        "system_backup" => vec![ApiCall::new(
            "/system/backup/save",
            json!({ "name": p("Backup Name") }),
        )],
        "system_ntp_client" => vec![ApiCall::new(
            "/system/ntp/client/set",
            json!({
                "enabled": p("Enabled"),
                "servers": format!("{},{}", p("Primary NTP Server"), p("Secondary NTP Server")),
            }),
        )],
        "enable_snmp" => vec![
            ApiCall::new(
                "/snmp/community/set",
                json!({ "numbers": "public", "name": p("Community") }),
            ),
            ApiCall::new("/snmp/set", json!({ "enabled": "yes" })),
        ],
        "custom" => vec![parse_raw_command(&p("command"))?],
        other => bail!("unknown template: {}", other),
    };

    Ok(plan)
}

/// Parse a raw command line like `/interface/bridge/add name=br0 comment=lab`
/// into a single API call
fn parse_raw_command(command: &str) -> Result<ApiCall> {
    let command = command.trim();
    let mut parts = command.split_whitespace();
    let path = match parts.next() {
        Some(p) if p.starts_with('/') => p,
        _ => bail!("command must start with a /path"),
    };

    let mut body = serde_json::Map::new();
    for part in parts {
        match part.split_once('=') {
            Some((key, value)) => {
                body.insert(key.to_string(), json!(value));
            }
            None => bail!("malformed argument '{}': expected key=value", part),
        }
    }

    Ok(ApiCall::new(path, serde_json::Value::Object(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bridge_add_plan() {
        let plan = build_plan("bridge_add", &payload(&[("Bridge Name", "br0")])).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].path, "/interface/bridge/add");
        assert_eq!(plan[0].body["name"], "br0");
    }

    #[test]
    fn test_block_website_is_two_calls_in_order() {
        let plan = build_plan("block_website", &payload(&[("URL", "example.com")])).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].path, "/ip/firewall/layer7-protocol/add");
        assert_eq!(plan[0].body["name"], "block_example.com");
        assert_eq!(plan[1].path, "/ip/firewall/filter/add");
        assert_eq!(plan[1].body["layer7-protocol"], "block_example.com");
    }

    #[test]
    fn test_lan_setup_skips_dhcp_when_disabled() {
        let p = payload(&[
            ("Interface", "ether2"),
            ("IP Address", "192.168.88.1/24"),
            ("DHCP Server", "no"),
            ("DNS", "8.8.8.8,1.1.1.1"),
        ]);
        let plan = build_plan("lan_setup", &p).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].path, "/ip/address/add");
        assert_eq!(plan[1].path, "/ip/dns/set");

        let mut p = p;
        p.insert("DHCP Server".into(), "yes".into());
        let plan = build_plan("lan_setup", &p).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[1].path, "/ip/dhcp-server/add");
    }

    #[test]
    fn test_service_toggle_disable() {
        let p = payload(&[
            ("Service Name", "telnet"),
            ("State (enable/disable)", "disable"),
            ("Port", "23"),
        ]);
        let plan = build_plan("service_toggle", &p).unwrap();
        assert_eq!(plan[0].body["disabled"], "yes");
        assert_eq!(plan[0].body["numbers"], "telnet");
    }

    #[test]
    fn test_firewall_filter_omits_blank_optionals() {
        let p = payload(&[
            ("Chain", "input"),
            ("Protocol", "tcp"),
            ("Action", "accept"),
            ("Dst Port", ""),
            ("Src Address", ""),
            ("Comment", "Accept established connections"),
        ]);
        let plan = build_plan("firewall_filter_add", &p).unwrap();
        let body = plan[0].body.as_object().unwrap();
        assert!(!body.contains_key("dst-port"));
        assert!(!body.contains_key("src-address"));
        assert_eq!(body["comment"], "Accept established connections");
    }

    #[test]
    fn test_custom_command_parse() {
        let p = payload(&[("command", "/interface/bridge/add name=br0 comment=lab")]);
        let plan = build_plan("custom", &p).unwrap();
        assert_eq!(plan[0].path, "/interface/bridge/add");
        assert_eq!(plan[0].body["name"], "br0");
        assert_eq!(plan[0].body["comment"], "lab");
    }

    #[test]
    fn test_custom_command_without_args() {
        let p = payload(&[("command", "/system/identity/print")]);
        let plan = build_plan("custom", &p).unwrap();
        assert_eq!(plan[0].path, "/system/identity/print");
        assert!(plan[0].body.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_custom_command_rejects_bad_input() {
        assert!(build_plan("custom", &payload(&[("command", "print all")])).is_err());
        assert!(build_plan("custom", &payload(&[("command", "/export bad arg")])).is_err());
    }

    #[test]
    fn test_unknown_template_rejected() {
        assert!(build_plan("no_such_template", &HashMap::new()).is_err());
    }
}
