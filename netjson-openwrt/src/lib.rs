//! NetJSON to OpenWrt UCI configuration rendering.
//!
//! This library turns a vendor-neutral NetJSON `DeviceConfiguration` into
//! the text configuration read by OpenWrt's UCI subsystem. NetJSON and UCI
//! group bridges differently, so the backend first derives a bridge index
//! from the document and then runs a fixed list of renderers over it.
//!
//! # Architecture
//!
//! - [`document`] — Input normalization and interface classification
//! - [`bridges`] — Bridge representatives and wireless `_attached` annotations
//! - [`schema`] — Validation against the embedded JSON Schema
//! - [`renderers`] — System, network, wireless and pass-through renderers,
//!   plus the pipeline that joins their blocks
//! - [`backend`] — [`OpenWrt`], tying the above together
//! - [`profile`] — TOML output profiles used by the command line
//!
//! # Examples
//!
//! ```
//! use netjson_openwrt::OpenWrt;
//! use serde_json::json;
//!
//! let backend = OpenWrt::new(json!({
//!     "general": {"hostname": "ap1"},
//!     "interfaces": [
//!         {"name": "eth0", "type": "ethernet"},
//!         {"name": "wlan0", "type": "wireless", "wireless": {"radio": "radio0", "mode": "access_point"}},
//!         {"name": "br-lan", "type": "bridge", "bridge_members": ["eth0", "wlan0"]}
//!     ]
//! }))?;
//! assert_eq!(backend.bridges().get("eth0"), Some(&["eth0".to_string()][..]));
//! let uci = backend.render()?;
//! assert!(uci.contains("option network 'eth0'"));
//! # Ok::<(), netjson_openwrt::BackendError>(())
//! ```
//!
//! # Built on uci-core
//!
//! UCI sections are assembled with `uci-core` and written through its
//! writer; everything NetJSON-specific lives in this crate.

pub mod backend;
pub mod bridges;
pub mod document;
pub mod error;
pub mod profile;
pub mod renderers;
pub mod schema;

pub use backend::{JsonOptions, OpenWrt};
pub use bridges::BridgeIndex;
pub use error::BackendError;
pub use renderers::RendererRole;
