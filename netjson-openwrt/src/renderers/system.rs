use serde_json::Value;
use uci_core::{write, UciPackage, UciSection};

use super::{str_field, RenderContext};
use crate::document::string_list;
use crate::error::BackendError;

const DEFAULT_HOSTNAME: &str = "OpenWrt";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Render `/etc/config/system` from `general`.
pub(super) fn render(ctx: &RenderContext<'_>) -> Result<String, BackendError> {
    let general = ctx.config.get("general").unwrap_or(&Value::Null);
    let mut package = UciPackage::new("system");

    package
        .push(UciSection::new("system"))
        .set(
            "hostname",
            str_field(general, "hostname").unwrap_or(DEFAULT_HOSTNAME),
        )
        .set(
            "timezone",
            str_field(general, "timezone").unwrap_or(DEFAULT_TIMEZONE),
        );

    let servers = string_list(general.get("ntp_servers"));
    if !servers.is_empty() {
        package
            .push(UciSection::named("timeserver", "ntp"))
            .set_list("server", servers);
    }

    Ok(write(&package))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::render;
    use crate::bridges::BridgeIndex;
    use crate::renderers::RenderContext;

    fn render_json(value: Value) -> String {
        let Value::Object(config) = value else {
            panic!("fixture must be an object");
        };
        render(&RenderContext::new(&config, &BridgeIndex::default())).expect("render")
    }

    #[test]
    fn defaults_hostname_and_timezone() {
        let out = render_json(json!({}));
        assert_eq!(
            out,
            "package system\n\nconfig system\n\toption hostname 'OpenWrt'\n\toption timezone 'UTC'\n"
        );
    }

    #[test]
    fn renders_general_settings_and_ntp() {
        let out = render_json(json!({
            "general": {
                "hostname": "ap-kitchen",
                "timezone": "Europe/Rome",
                "ntp_servers": ["0.openwrt.pool.ntp.org", "1.openwrt.pool.ntp.org"]
            }
        }));
        assert_eq!(
            out,
            "package system

config system
\toption hostname 'ap-kitchen'
\toption timezone 'Europe/Rome'

config timeserver 'ntp'
\tlist server '0.openwrt.pool.ntp.org'
\tlist server '1.openwrt.pool.ntp.org'
"
        );
    }

    #[test]
    fn empty_ntp_list_emits_no_timeserver() {
        let out = render_json(json!({"general": {"ntp_servers": []}}));
        assert!(!out.contains("timeserver"));
    }
}
