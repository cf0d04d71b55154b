use serde_json::Value;
use uci_core::{sanitize_name, write, UciPackage, UciSection};

use super::{str_field, RenderContext};
use crate::document::{interface_name, interfaces, string_list, InterfaceKind, ATTACHED_KEY};
use crate::error::BackendError;

/// Render `/etc/config/wireless`: one `wifi-device` per radio, one
/// `wifi-iface` per wireless interface.
pub(super) fn render(ctx: &RenderContext<'_>) -> Result<String, BackendError> {
    let mut package = UciPackage::new("wireless");

    if let Some(radios) = ctx.config.get("radios").and_then(Value::as_array) {
        for radio in radios {
            if let Some(section) = radio_section(radio) {
                package.push(section);
            }
        }
    }

    for interface in interfaces(ctx.config) {
        if InterfaceKind::of(interface) == InterfaceKind::Wireless {
            package.push(iface_section(interface)?);
        }
    }

    if package.is_empty() {
        return Ok(String::new());
    }
    Ok(write(&package))
}

fn radio_section(radio: &Value) -> Option<UciSection> {
    let name = str_field(radio, "name")?;
    let channel = radio.get("channel").and_then(Value::as_u64).unwrap_or(0);
    let protocol = str_field(radio, "protocol").unwrap_or_default();
    let width = radio
        .get("channel_width")
        .and_then(Value::as_u64)
        .unwrap_or(20);

    let mut section = UciSection::named("wifi-device", sanitize_name(name));
    section.set("type", "mac80211");
    section.set(
        "channel",
        if channel == 0 {
            "auto".to_string()
        } else {
            channel.to_string()
        },
    );
    let hwmode = match protocol {
        "802.11a" | "802.11ac" => "11a",
        "802.11b" => "11b",
        _ if channel > 14 => "11a",
        _ => "11g",
    };
    section.set("hwmode", hwmode);
    match protocol {
        "802.11n" => {
            section.set("htmode", format!("HT{width}"));
        }
        "802.11ac" => {
            section.set("htmode", format!("VHT{width}"));
        }
        _ => {}
    }
    if let Some(phy) = str_field(radio, "phy") {
        section.set("phy", phy);
    }
    if let Some(power) = radio.get("tx_power").and_then(Value::as_u64) {
        section.set("txpower", power.to_string());
    }
    if let Some(country) = str_field(radio, "country") {
        section.set("country", country);
    }
    if radio.get("disabled").and_then(Value::as_bool) == Some(true) {
        section.set("disabled", "1");
    }
    Some(section)
}

fn iface_section(interface: &Value) -> Result<UciSection, BackendError> {
    let name = interface_name(interface);
    let uci_name = sanitize_name(name);
    let wireless = interface.get("wireless").unwrap_or(&Value::Null);
    let mut section = UciSection::named("wifi-iface", format!("wifi_{uci_name}"));

    if let Some(radio) = str_field(wireless, "radio") {
        section.set("device", sanitize_name(radio));
    }
    section.set("ifname", name);
    let mode = str_field(wireless, "mode").unwrap_or("access_point");
    section.set("mode", uci_mode(mode).ok_or_else(|| BackendError::Render {
        section: format!("wireless.wifi_{uci_name}"),
        message: format!("unsupported wireless mode '{mode}'"),
    })?);
    if let Some(ssid) = str_field(wireless, "ssid") {
        section.set("ssid", ssid);
    }
    if wireless.get("hidden").and_then(Value::as_bool) == Some(true) {
        section.set("hidden", "1");
    }

    let network = string_list(interface.get(ATTACHED_KEY))
        .first()
        .map_or_else(|| uci_name.clone(), |representative| sanitize_name(representative));
    section.set("network", network);

    let encryption = wireless.get("encryption").unwrap_or(&Value::Null);
    section.set(
        "encryption",
        str_field(encryption, "protocol").unwrap_or("none"),
    );
    if let Some(key) = str_field(encryption, "key") {
        section.set("key", key);
    }
    Ok(section)
}

fn uci_mode(mode: &str) -> Option<&'static str> {
    match mode {
        "access_point" => Some("ap"),
        "station" => Some("sta"),
        "adhoc" => Some("adhoc"),
        "wds" => Some("wds"),
        "monitor" => Some("monitor"),
        "802.11s" => Some("mesh"),
        _ => None,
    }
}
