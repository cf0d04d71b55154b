//! Configuration normalization and interface classification.
//!
//! The backend works on the raw JSON object instead of a fully typed model:
//! unknown top-level keys must survive untouched so the default renderer and
//! `json()` can see them. Interface kinds are still classified through a
//! closed enum so every consumer handles the same set of cases.

use serde_json::{Map, Value};

use crate::error::BackendError;

/// Discriminator injected when the document does not carry one.
pub const DEFAULT_TYPE: &str = "DeviceConfiguration";

/// Annotation written on wireless interfaces that belong to a bridge.
pub const ATTACHED_KEY: &str = "_attached";

/// Check that `raw` is a JSON object and inject the default `type`.
///
/// Takes ownership of the value, so the caller cannot mutate the document
/// behind the backend's back once the bridge index has been derived from it.
pub fn normalize(raw: Value) -> Result<Map<String, Value>, BackendError> {
    let mut config = match raw {
        Value::Object(map) => map,
        other => {
            return Err(BackendError::Type {
                found: json_kind(&other),
            })
        }
    };
    if !config.contains_key("type") {
        config.insert("type".to_string(), Value::String(DEFAULT_TYPE.to_string()));
    }
    Ok(config)
}

/// Human-readable name of a JSON value's kind.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared kind of a NetJSON interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceKind {
    Ethernet,
    Wireless,
    Bridge,
    Virtual,
    Loopback,
    Other,
    /// A `type` string outside the known set. Kept so renderers still see
    /// the interface; schema validation rejects it.
    Unrecognized(String),
    /// No `type` member, or one that is not a string.
    Missing,
}

impl InterfaceKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ethernet" => Self::Ethernet,
            "wireless" => Self::Wireless,
            "bridge" => Self::Bridge,
            "virtual" => Self::Virtual,
            "loopback" => Self::Loopback,
            "other" => Self::Other,
            unknown => Self::Unrecognized(unknown.to_string()),
        }
    }

    /// Classify an interface object by its `type` member.
    pub fn of(interface: &Value) -> Self {
        match interface.get("type").and_then(Value::as_str) {
            Some(raw) => Self::parse(raw),
            None => Self::Missing,
        }
    }
}

/// The document's `interfaces` list. Absent or malformed lists read as empty.
pub fn interfaces(config: &Map<String, Value>) -> &[Value] {
    config
        .get("interfaces")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Mutable access to the `interfaces` list, if present.
pub fn interfaces_mut(config: &mut Map<String, Value>) -> Option<&mut Vec<Value>> {
    config.get_mut("interfaces").and_then(Value::as_array_mut)
}

/// An interface's `name`, or an empty string when it has none.
pub fn interface_name(interface: &Value) -> &str {
    interface.get("name").and_then(Value::as_str).unwrap_or_default()
}

/// Collect the string items of an array member, skipping anything else.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
