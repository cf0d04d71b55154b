//! Pass-through rendering of arbitrary UCI packages.
//!
//! Top-level keys the other renderers do not consume are treated as UCI
//! packages written out as-is:
//!
//! ```json
//! {"led": {"led": [{"name": "usb", "sysfs": "tp-link:green:usb", "trigger": "usbdev"}]}}
//! ```
//!
//! renders `package led` with one `config led 'usb'` section.

use serde_json::{Map, Value};
use uci_core::{is_valid_name, is_valid_type, sanitize_name, write_all, UciPackage, UciSection};

use super::{scalar_text, RenderContext};
use crate::error::BackendError;

/// Keys owned by the system, network and wireless renderers.
const CONSUMED_KEYS: &[&str] = &[
    "type",
    "general",
    "interfaces",
    "radios",
    "routes",
    "dns_servers",
    "dns_search",
];

pub(super) fn render(ctx: &RenderContext<'_>) -> Result<String, BackendError> {
    let mut packages = Vec::new();
    for (key, value) in ctx.config {
        if CONSUMED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(body) = value.as_object() {
            packages.push(package(key, body)?);
        }
    }
    Ok(write_all(&packages))
}

fn package(name: &str, body: &Map<String, Value>) -> Result<UciPackage, BackendError> {
    if !is_valid_name(name) {
        return Err(invalid_identifier(name, "package name", name));
    }
    let mut package = UciPackage::new(name);
    for (kind, blocks) in body {
        if !is_valid_type(kind) {
            return Err(invalid_identifier(name, "section type", kind));
        }
        match blocks {
            Value::Array(items) => {
                for item in items {
                    match item.as_object() {
                        Some(options) => {
                            package.push(section(name, kind, options)?);
                        }
                        None => {
                            tracing::debug!(package = name, kind = %kind, "skipping non-object section");
                        }
                    }
                }
            }
            Value::Object(options) => {
                package.push(section(name, kind, options)?);
            }
            _ => {
                tracing::debug!(package = name, kind = %kind, "skipping scalar section");
            }
        }
    }
    Ok(package)
}

fn section(
    package: &str,
    kind: &str,
    options: &Map<String, Value>,
) -> Result<UciSection, BackendError> {
    let mut section = match options.get("name").and_then(Value::as_str) {
        Some(name) => UciSection::named(kind, sanitize_name(name)),
        None => UciSection::new(kind),
    };
    for (key, value) in options {
        if key == "name" {
            continue;
        }
        if !is_valid_name(key) {
            return Err(invalid_identifier(package, "option name", key));
        }
        match value {
            Value::Array(items) => {
                section.set_list(key.as_str(), items.iter().filter_map(scalar_text));
            }
            other => match scalar_text(other) {
                Some(text) => {
                    section.set(key.as_str(), text);
                }
                None => {
                    tracing::debug!(package, kind, option = %key, "skipping non-scalar option");
                }
            },
        }
    }
    Ok(section)
}

fn invalid_identifier(package: &str, what: &str, found: &str) -> BackendError {
    BackendError::Render {
        section: format!("default.{package}"),
        message: format!("invalid UCI {what} {found:?}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::render;
    use crate::bridges::BridgeIndex;
    use crate::error::BackendError;
    use crate::renderers::RenderContext;

    fn try_render(value: Value) -> Result<String, BackendError> {
        let Value::Object(config) = value else {
            panic!("fixture must be an object");
        };
        render(&RenderContext::new(&config, &BridgeIndex::default()))
    }

    fn render_json(value: Value) -> String {
        try_render(value).expect("render")
    }

    #[test]
    fn consumed_keys_produce_nothing() {
        let out = render_json(json!({
            "type": "DeviceConfiguration",
            "general": {"hostname": "x"},
            "interfaces": [],
            "dns_servers": ["8.8.8.8"]
        }));
        assert_eq!(out, "");
    }

    #[test]
    fn renders_extra_packages_in_document_order() {
        let out = render_json(json!({
            "type": "DeviceConfiguration",
            "led": {
                "led": [
                    {"name": "usb", "sysfs": "tp-link:green:usb", "trigger": "usbdev", "default": false}
                ]
            },
            "luci": {
                "core": {"name": "main", "lang": "auto", "mediaurlbase": "/luci-static/bootstrap"},
                "internal": {"name": "themes", "Bootstrap": "/luci-static/bootstrap"}
            },
            "firewall": {
                "zone": [{"name": "lan", "network": ["lan", "guest"], "input": "ACCEPT", "nested": {"x": 1}}],
                "bogus": 3
            }
        }));

        assert_eq!(
            out,
            "package led

config led 'usb'
\toption sysfs 'tp-link:green:usb'
\toption trigger 'usbdev'
\toption default '0'

package luci

config core 'main'
\toption lang 'auto'
\toption mediaurlbase '/luci-static/bootstrap'

config internal 'themes'
\toption Bootstrap '/luci-static/bootstrap'

package firewall

config zone 'lan'
\tlist network 'lan'
\tlist network 'guest'
\toption input 'ACCEPT'
"
        );
    }

    #[test]
    fn sections_without_name_are_anonymous() {
        let out = render_json(json!({"dropbear": {"dropbear": [{"Port": 22}]}}));
        assert_eq!(out, "package dropbear\n\nconfig dropbear\n\toption Port '22'\n");
    }

    #[test]
    fn whitespace_in_section_type_is_rejected() {
        let err = try_render(json!({"foo": {"bar baz": {"name": "x", "opt": "v"}}}))
            .expect_err("section type with a space");
        match err {
            BackendError::Render { section, message } => {
                assert_eq!(section, "default.foo");
                assert!(message.contains("section type"));
            }
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn option_key_cannot_inject_lines() {
        let err = try_render(json!({"foo": {"bar": {"name": "x", "opt\n\toption injected": "v"}}}))
            .expect_err("option key with a newline");
        match err {
            BackendError::Render { section, message } => {
                assert_eq!(section, "default.foo");
                assert!(message.contains("option name"));
            }
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn package_name_must_be_an_identifier() {
        let err = try_render(json!({"my-pkg": {"bar": {"opt": "v"}}})).expect_err("dash in package");
        assert!(matches!(err, BackendError::Render { .. }));
    }
}
