//! Renderer roles and the pipeline that joins their output.
//!
//! Each role turns the shared configuration (plus the bridge index) into
//! the text of one or more UCI packages. Roles run in the fixed order of
//! [`RendererRole::ALL`] so that output stays stable and diffable.

mod default;
mod network;
mod system;
mod wireless;

use serde_json::{Map, Value};

use crate::bridges::BridgeIndex;
use crate::error::BackendError;

/// Everything a renderer may read.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a Map<String, Value>,
    pub bridges: &'a BridgeIndex,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a Map<String, Value>, bridges: &'a BridgeIndex) -> Self {
        Self { config, bridges }
    }
}

/// The output sections of the OpenWrt backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererRole {
    System,
    Network,
    Wireless,
    Default,
}

impl RendererRole {
    /// Roles in output order.
    pub const ALL: [RendererRole; 4] = [
        RendererRole::System,
        RendererRole::Network,
        RendererRole::Wireless,
        RendererRole::Default,
    ];

    /// Firmware package that must be installed for this section to apply.
    pub const fn package(self) -> &'static str {
        match self {
            Self::System => "base-files",
            Self::Network => "netifd",
            Self::Wireless => "hostapd-common",
            Self::Default => "uci",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Network => "network",
            Self::Wireless => "wireless",
            Self::Default => "default",
        }
    }

    /// Render this role's block. An empty string means nothing to emit.
    pub fn render(self, ctx: &RenderContext<'_>) -> Result<String, BackendError> {
        match self {
            Self::System => system::render(ctx),
            Self::Network => network::render(ctx),
            Self::Wireless => wireless::render(ctx),
            Self::Default => default::render(ctx),
        }
    }
}

/// Run every role in `roles` and join the non-empty blocks.
pub fn render_pipeline(
    ctx: &RenderContext<'_>,
    roles: &[RendererRole],
) -> Result<String, BackendError> {
    concat_blocks(roles.iter().map(|role| {
        let block = role.render(ctx)?;
        tracing::debug!(role = role.name(), bytes = block.len(), "rendered block");
        Ok(block)
    }))
}

/// Join blocks, inserting a newline only between two non-empty blocks.
///
/// Blocks end with their own newline, so the inserted one yields exactly
/// one blank line between sections. The first error stops the pipeline.
pub fn concat_blocks<I, E>(blocks: I) -> Result<String, E>
where
    I: IntoIterator<Item = Result<String, E>>,
{
    let mut output = String::new();
    for block in blocks {
        let block = block?;
        if !output.is_empty() && !block.is_empty() {
            output.push('\n');
        }
        output.push_str(&block);
    }
    Ok(output)
}

/// UCI text for a scalar JSON value. Booleans map to `1`/`0`; arrays,
/// objects and null have no scalar form.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(if *flag { "1" } else { "0" }.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read a string member of a JSON object.
pub(crate) fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{concat_blocks, scalar_text, RendererRole};

    #[test]
    fn separator_only_between_non_empty_blocks() {
        let blocks = ["", "B", "", "D"].map(|b| Ok::<_, ()>(b.to_string()));
        assert_eq!(concat_blocks(blocks), Ok("B\nD".to_string()));
    }

    #[test]
    fn all_empty_blocks_yield_empty_output() {
        let blocks = ["", "", ""].map(|b| Ok::<_, ()>(b.to_string()));
        assert_eq!(concat_blocks(blocks), Ok(String::new()));
    }

    #[test]
    fn first_error_stops_pipeline() {
        let blocks = vec![Ok("A\n".to_string()), Err("boom"), Ok("C\n".to_string())];
        assert_eq!(concat_blocks(blocks), Err("boom"));
    }

    #[test]
    fn role_order_and_packages_are_fixed() {
        let names: Vec<&str> = RendererRole::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["system", "network", "wireless", "default"]);
        let packages: Vec<&str> = RendererRole::ALL.iter().map(|r| r.package()).collect();
        assert_eq!(packages, vec!["base-files", "netifd", "hostapd-common", "uci"]);
    }

    #[test]
    fn scalar_text_maps_booleans_and_numbers() {
        assert_eq!(scalar_text(&json!(true)).as_deref(), Some("1"));
        assert_eq!(scalar_text(&json!(false)).as_deref(), Some("0"));
        assert_eq!(scalar_text(&json!(1500)).as_deref(), Some("1500"));
        assert_eq!(scalar_text(&json!([1])), None);
    }
}
