use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridges::BridgeIndex;
use crate::document::normalize;
use crate::error::BackendError;
use crate::renderers::{render_pipeline, RenderContext, RendererRole};
use crate::schema;

/// Serialization options for [`OpenWrt::json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Pretty-print with this many spaces per level. `None` is compact.
    pub indent: Option<usize>,
    /// Sort object keys recursively instead of keeping document order.
    pub sort_keys: bool,
}

/// OpenWrt backend bound to one NetJSON DeviceConfiguration.
///
/// The document is moved in, normalized and indexed once; afterwards the
/// backend only reads it, so `render`, `validate` and `json` may be called
/// any number of times (and from several threads) with the same result.
#[derive(Debug, Clone)]
pub struct OpenWrt {
    config: Map<String, Value>,
    bridges: BridgeIndex,
}

impl OpenWrt {
    /// Renderer roles in output order.
    pub const RENDERERS: &'static [RendererRole] = &RendererRole::ALL;

    pub fn new(config: Value) -> Result<Self, BackendError> {
        let mut config = normalize(config)?;
        let bridges = BridgeIndex::build(&mut config)?;
        Ok(Self { config, bridges })
    }

    /// Parse a JSON document and build a backend from it.
    pub fn from_json_str(raw: &str) -> Result<Self, BackendError> {
        Self::new(serde_json::from_str(raw)?)
    }

    /// The normalized document, including `_attached` annotations.
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn bridges(&self) -> &BridgeIndex {
        &self.bridges
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        schema::validate(&self.config)
    }

    /// Validate, then render every section as UCI text.
    pub fn render(&self) -> Result<String, BackendError> {
        self.validate()?;
        let ctx = RenderContext::new(&self.config, &self.bridges);
        render_pipeline(&ctx, Self::RENDERERS)
    }

    /// Validate, then serialize the normalized document.
    pub fn json(&self, options: &JsonOptions) -> Result<String, BackendError> {
        self.validate()?;
        if options.sort_keys {
            serialize(&sort_keys(&self.config), options.indent)
        } else {
            serialize(&self.config, options.indent)
        }
    }

    /// Firmware packages needed by the output, one per renderer role.
    pub fn packages() -> Vec<&'static str> {
        Self::RENDERERS.iter().map(|role| role.package()).collect()
    }
}

fn serialize<T: Serialize>(value: &T, indent: Option<usize>) -> Result<String, BackendError> {
    let Some(width) = indent else {
        return Ok(serde_json::to_string(value)?);
    };
    let indent = " ".repeat(width);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf)
        .map_err(|err| BackendError::Json(serde::ser::Error::custom(err)))
}

fn sort_keys(map: &Map<String, Value>) -> Map<String, Value> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| (key.clone(), sort_value(&map[key.as_str()])))
        .collect()
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sort_keys(map)),
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}
