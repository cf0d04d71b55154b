//! `/etc/config/network` rendering.
//!
//! Bridges are not declared on the NetJSON bridge interface itself: the
//! section of the bridge representative (see [`crate::bridges`]) becomes a
//! `type 'bridge'` interface listing the wired members, and attached
//! wireless interfaces join it from the wireless package. Addresses and
//! link options of the bridge interface move onto that section.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use serde_json::{json, Value};
use uci_core::{sanitize_name, write, UciPackage, UciSection};

use super::{scalar_text, str_field, RenderContext};
use crate::bridges::BridgeIndex;
use crate::document::{interface_name, interfaces, string_list, InterfaceKind, ATTACHED_KEY};
use crate::error::BackendError;

struct DnsSettings {
    servers: Vec<String>,
    search: Vec<String>,
}

pub(super) fn render(ctx: &RenderContext<'_>) -> Result<String, BackendError> {
    let dns = DnsSettings {
        servers: string_list(ctx.config.get("dns_servers")),
        search: string_list(ctx.config.get("dns_search")),
    };
    let mut package = UciPackage::new("network");
    let mut declared = HashSet::new();
    let bridge_interfaces: HashMap<&str, &Value> = interfaces(ctx.config)
        .iter()
        .filter(|interface| InterfaceKind::of(interface) == InterfaceKind::Bridge)
        .map(|interface| (interface_name(interface), interface))
        .collect();
    let bridge_for = |representative: &str| {
        ctx.bridges
            .bridge_of(representative)
            .and_then(|bridge| bridge_interfaces.get(bridge).copied())
    };

    for interface in interfaces(ctx.config) {
        let kind = InterfaceKind::of(interface);
        match kind {
            InterfaceKind::Bridge => continue,
            InterfaceKind::Wireless if interface.get(ATTACHED_KEY).is_some() => continue,
            _ => {}
        }
        let name = interface_name(interface);
        if name.is_empty() {
            continue;
        }
        declared.insert(name);
        let bridge = bridge_for(name);
        render_interface(&mut package, interface, &kind, bridge, ctx.bridges, &dns)?;
    }

    for (representative, _) in ctx.bridges.iter() {
        if declared.contains(representative) {
            continue;
        }
        let wired = json!({"name": representative, "type": "ethernet"});
        let bridge = bridge_for(representative);
        render_interface(
            &mut package,
            &wired,
            &InterfaceKind::Ethernet,
            bridge,
            ctx.bridges,
            &dns,
        )?;
    }

    if let Some(routes) = ctx.config.get("routes").and_then(Value::as_array) {
        for (idx, route) in routes.iter().enumerate() {
            package.push(route_section(idx, route)?);
        }
    }

    if package.is_empty() {
        return Ok(String::new());
    }
    Ok(write(&package))
}

fn render_interface(
    package: &mut UciPackage,
    interface: &Value,
    kind: &InterfaceKind,
    bridge: Option<&Value>,
    bridges: &BridgeIndex,
    dns: &DnsSettings,
) -> Result<(), BackendError> {
    let name = interface_name(interface);
    let uci_name = sanitize_name(name);
    let members = bridges.get(name);
    // wireless devices bind to the network from the wifi-iface side
    let device = match (kind, members) {
        (InterfaceKind::Wireless, _) => None,
        (_, Some(members)) => Some(members.join(" ")),
        (_, None) => Some(name.to_string()),
    };
    let alias_device = if members.is_some() {
        Some(format!("br-{uci_name}"))
    } else {
        device.clone()
    };

    let own = address_list(interface);
    let bridged = bridge.map(address_list).unwrap_or_default();
    let addresses = match (own.is_empty(), bridged.is_empty()) {
        (false, false) => {
            return Err(render_error(
                &uci_name,
                &format!(
                    "both '{name}' and bridge '{}' declare addresses",
                    bridge.map(interface_name).unwrap_or_default()
                ),
            ))
        }
        (true, _) => bridged,
        (false, true) => own,
    };

    if addresses.is_empty() {
        let section = package.push(UciSection::named("interface", uci_name.as_str()));
        if let Some(device) = &device {
            section.set("ifname", device.as_str());
        }
        if members.is_some() {
            section.set("type", "bridge");
        }
        section.set("proto", "none");
        set_link_options(section, interface, bridge);
        return Ok(());
    }

    for (idx, address) in addresses.iter().enumerate() {
        let section_name = if idx == 0 {
            uci_name.clone()
        } else {
            format!("{uci_name}_{}", idx + 1)
        };
        let mut section = UciSection::named("interface", section_name.as_str());
        let ifname = if idx == 0 { &device } else { &alias_device };
        if let Some(ifname) = ifname {
            section.set("ifname", ifname.as_str());
        }
        if idx == 0 && members.is_some() {
            section.set("type", "bridge");
        }
        let is_static = apply_address(&mut section, &section_name, address)?;
        if idx == 0 {
            set_link_options(&mut section, interface, bridge);
        }
        if is_static {
            if !dns.servers.is_empty() {
                section.set("dns", dns.servers.join(" "));
            }
            if !dns.search.is_empty() {
                section.set("dns_search", dns.search.join(" "));
            }
        }
        package.push(section);
    }
    Ok(())
}

/// Map one NetJSON address onto `section`. Returns whether it is static.
fn apply_address(
    section: &mut UciSection,
    section_name: &str,
    address: &Value,
) -> Result<bool, BackendError> {
    let proto = str_field(address, "proto").unwrap_or_default();
    let family = str_field(address, "family").unwrap_or("ipv4");
    match (proto, family) {
        ("dhcp", "ipv6") => {
            section.set("proto", "dhcpv6");
            Ok(false)
        }
        ("dhcp", _) => {
            section.set("proto", "dhcp");
            Ok(false)
        }
        ("static", family) => {
            let Some(ip) = str_field(address, "address") else {
                return Err(render_error(section_name, "static address without 'address'"));
            };
            let mask = address.get("mask").and_then(Value::as_u64);
            section.set("proto", "static");
            if family == "ipv6" {
                section.set("ip6addr", format!("{ip}/{}", mask.unwrap_or(64)));
                if let Some(gateway) = str_field(address, "gateway") {
                    section.set("ip6gw", gateway);
                }
            } else {
                let netmask = prefix_to_netmask(mask.unwrap_or(32)).ok_or_else(|| {
                    render_error(section_name, "ipv4 mask must be between 0 and 32")
                })?;
                section.set("ipaddr", ip).set("netmask", netmask);
                if let Some(gateway) = str_field(address, "gateway") {
                    section.set("gateway", gateway);
                }
            }
            Ok(true)
        }
        (other, _) => Err(render_error(
            section_name,
            &format!("unsupported address proto '{other}'"),
        )),
    }
}

fn address_list(interface: &Value) -> &[Value] {
    interface
        .get("addresses")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Link options of `interface`, overridden by those of its bridge.
fn set_link_options(section: &mut UciSection, interface: &Value, bridge: Option<&Value>) {
    apply_link_options(section, interface);
    if let Some(bridge) = bridge {
        apply_link_options(section, bridge);
    }
}

fn apply_link_options(section: &mut UciSection, interface: &Value) {
    if let Some(mtu) = interface.get("mtu").and_then(scalar_text) {
        section.set("mtu", mtu);
    }
    if let Some(mac) = str_field(interface, "mac") {
        section.set("macaddr", mac);
    }
    if interface.get("autostart").and_then(Value::as_bool) == Some(false) {
        section.set("auto", "0");
    }
}

fn route_section(idx: usize, route: &Value) -> Result<UciSection, BackendError> {
    let section_name = format!("route{}", idx + 1);
    let destination = str_field(route, "destination").unwrap_or_default();
    let is_ipv6 = destination.contains(':');
    let mut section = UciSection::named(if is_ipv6 { "route6" } else { "route" }, &section_name);

    if let Some(device) = str_field(route, "device") {
        section.set("interface", sanitize_name(device));
    }
    if is_ipv6 {
        section.set("target", destination);
    } else {
        let (target, prefix) = match destination.split_once('/') {
            Some((target, prefix)) => (target, prefix.parse::<u64>().ok()),
            None => (destination, Some(32)),
        };
        let netmask = prefix
            .and_then(prefix_to_netmask)
            .ok_or_else(|| render_error(&section_name, "invalid ipv4 destination prefix"))?;
        section.set("target", target).set("netmask", netmask);
    }
    if let Some(next) = str_field(route, "next") {
        section.set("gateway", next);
    }
    if let Some(cost) = route.get("cost").and_then(scalar_text) {
        section.set("metric", cost);
    }
    Ok(section)
}

/// Dotted netmask for an IPv4 prefix length, `None` above 32.
fn prefix_to_netmask(prefix: u64) -> Option<String> {
    let prefix = u32::try_from(prefix).ok().filter(|p| *p <= 32)?;
    let bits = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    Some(Ipv4Addr::from(bits).to_string())
}

fn render_error(section: &str, message: &str) -> BackendError {
    BackendError::Render {
        section: format!("network.{section}"),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    use super::{prefix_to_netmask, render};
    use crate::bridges::BridgeIndex;
    use crate::error::BackendError;
    use crate::renderers::RenderContext;

    fn indexed(value: Value) -> (Map<String, Value>, BridgeIndex) {
        let Value::Object(mut config) = value else {
            panic!("fixture must be an object");
        };
        let index = BridgeIndex::build(&mut config).expect("index");
        (config, index)
    }

    fn render_json(value: Value) -> Result<String, BackendError> {
        let (config, index) = indexed(value);
        render(&RenderContext::new(&config, &index))
    }

    #[test]
    fn netmask_from_prefix() {
        assert_eq!(prefix_to_netmask(24).as_deref(), Some("255.255.255.0"));
        assert_eq!(prefix_to_netmask(32).as_deref(), Some("255.255.255.255"));
        assert_eq!(prefix_to_netmask(0).as_deref(), Some("0.0.0.0"));
        assert_eq!(prefix_to_netmask(33), None);
    }

    #[test]
    fn nothing_to_render_is_empty() {
        assert_eq!(render_json(json!({})).expect("render"), "");
    }

    #[test]
    fn loopback_and_dhcp_interfaces() {
        let out = render_json(json!({
            "interfaces": [
                {
                    "name": "lo",
                    "type": "loopback",
                    "addresses": [
                        {"proto": "static", "family": "ipv4", "address": "127.0.0.1", "mask": 8}
                    ]
                },
                {
                    "name": "eth0.2",
                    "type": "ethernet",
                    "mtu": 1480,
                    "autostart": false,
                    "addresses": [
                        {"proto": "dhcp", "family": "ipv4"},
                        {"proto": "dhcp", "family": "ipv6"}
                    ]
                }
            ]
        }))
        .expect("render");

        assert_eq!(
            out,
            "package network

config interface 'lo'
\toption ifname 'lo'
\toption proto 'static'
\toption ipaddr '127.0.0.1'
\toption netmask '255.0.0.0'

config interface 'eth0_2'
\toption ifname 'eth0.2'
\toption proto 'dhcp'
\toption mtu '1480'
\toption auto '0'

config interface 'eth0_2_2'
\toption ifname 'eth0.2'
\toption proto 'dhcpv6'
"
        );
    }

    #[test]
    fn bridge_lands_on_representative() {
        let out = render_json(json!({
            "dns_servers": ["10.0.0.1", "8.8.8.8"],
            "dns_search": ["lan"],
            "interfaces": [
                {
                    "name": "eth0",
                    "type": "ethernet",
                    "addresses": [
                        {"proto": "static", "family": "ipv4", "address": "192.168.1.1", "mask": 24},
                        {"proto": "static", "family": "ipv6", "address": "fd00::1", "mask": 64}
                    ]
                },
                {"name": "wlan0", "type": "wireless", "wireless": {"radio": "radio0", "mode": "access_point"}},
                {"name": "br-lan", "type": "bridge", "bridge_members": ["eth0", "wlan0", "eth1"]}
            ]
        }))
        .expect("render");

        assert_eq!(
            out,
            "package network

config interface 'eth0'
\toption ifname 'eth0 eth1'
\toption type 'bridge'
\toption proto 'static'
\toption ipaddr '192.168.1.1'
\toption netmask '255.255.255.0'
\toption dns '10.0.0.1 8.8.8.8'
\toption dns_search 'lan'

config interface 'eth0_2'
\toption ifname 'br-eth0'
\toption proto 'static'
\toption ip6addr 'fd00::1/64'
\toption dns '10.0.0.1 8.8.8.8'
\toption dns_search 'lan'
"
        );
    }

    #[test]
    fn undeclared_representative_gets_bridge_section() {
        let out = render_json(json!({
            "interfaces": [
                {"name": "br-lan", "type": "bridge", "bridge_members": ["eth1", "eth2"]}
            ]
        }))
        .expect("render");
        assert_eq!(
            out,
            "package network

config interface 'eth1'
\toption ifname 'eth1 eth2'
\toption type 'bridge'
\toption proto 'none'
"
        );
    }

    #[test]
    fn bridge_addresses_and_link_options_reach_synthesized_section() {
        let out = render_json(json!({
            "interfaces": [{
                "name": "br-lan",
                "type": "bridge",
                "bridge_members": ["eth0", "eth1"],
                "mtu": 1400,
                "addresses": [
                    {"proto": "static", "family": "ipv4", "address": "192.168.1.1", "mask": 24}
                ]
            }]
        }))
        .expect("render");
        assert_eq!(
            out,
            "package network

config interface 'eth0'
\toption ifname 'eth0 eth1'
\toption type 'bridge'
\toption proto 'static'
\toption ipaddr '192.168.1.1'
\toption netmask '255.255.255.0'
\toption mtu '1400'
"
        );
    }

    #[test]
    fn bridge_settings_override_declared_representative() {
        let out = render_json(json!({
            "interfaces": [
                {"name": "eth0", "type": "ethernet", "mtu": 1500, "mac": "52:54:00:00:00:01"},
                {
                    "name": "br-lan",
                    "type": "bridge",
                    "bridge_members": ["eth0"],
                    "mtu": 1400,
                    "autostart": false,
                    "addresses": [{"proto": "dhcp", "family": "ipv4"}]
                }
            ]
        }))
        .expect("render");
        assert_eq!(
            out,
            "package network

config interface 'eth0'
\toption ifname 'eth0'
\toption type 'bridge'
\toption proto 'dhcp'
\toption mtu '1400'
\toption macaddr '52:54:00:00:00:01'
\toption auto '0'
"
        );
    }

    #[test]
    fn addresses_on_both_representative_and_bridge_conflict() {
        let err = render_json(json!({
            "interfaces": [
                {
                    "name": "eth0",
                    "type": "ethernet",
                    "addresses": [{"proto": "dhcp", "family": "ipv4"}]
                },
                {
                    "name": "br-lan",
                    "type": "bridge",
                    "bridge_members": ["eth0", "eth1"],
                    "addresses": [
                        {"proto": "static", "family": "ipv4", "address": "10.0.0.1", "mask": 24}
                    ]
                }
            ]
        }))
        .expect_err("two address sources");
        match err {
            BackendError::Render { section, message } => {
                assert_eq!(section, "network.eth0");
                assert!(message.contains("bridge 'br-lan'"));
            }
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn unattached_wireless_gets_network_without_ifname() {
        let out = render_json(json!({
            "interfaces": [
                {
                    "name": "wlan0",
                    "type": "wireless",
                    "wireless": {"radio": "radio0", "mode": "station"},
                    "addresses": [{"proto": "dhcp", "family": "ipv4"}]
                }
            ]
        }))
        .expect("render");
        assert_eq!(out, "package network\n\nconfig interface 'wlan0'\n\toption proto 'dhcp'\n");
    }

    #[test]
    fn routes_for_both_families() {
        let out = render_json(json!({
            "routes": [
                {"device": "eth0", "next": "192.168.1.254", "destination": "10.10.0.0/16", "cost": 2},
                {"device": "br-lan", "next": "fd00::fe", "destination": "fd01::/64"}
            ]
        }))
        .expect("render");
        assert_eq!(
            out,
            "package network

config route 'route1'
\toption interface 'eth0'
\toption target '10.10.0.0'
\toption netmask '255.255.0.0'
\toption gateway '192.168.1.254'
\toption metric '2'

config route6 'route2'
\toption interface 'br_lan'
\toption target 'fd01::/64'
\toption gateway 'fd00::fe'
"
        );
    }

    #[test]
    fn oversized_ipv4_mask_is_a_render_error() {
        let err = render_json(json!({
            "interfaces": [{
                "name": "eth0",
                "type": "ethernet",
                "addresses": [{"proto": "static", "family": "ipv4", "address": "10.0.0.1", "mask": 64}]
            }]
        }))
        .expect_err("mask 64 is not ipv4");
        match err {
            BackendError::Render { section, .. } => assert_eq!(section, "network.eth0"),
            other => panic!("expected render error, got {other:?}"),
        }
    }
}
