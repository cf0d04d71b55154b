//! Generic UCI text model and writer used by higher-level backends.
//!
//! UCI is the configuration subsystem of OpenWrt. A configuration is split
//! into packages (one file under `/etc/config`), each holding an ordered list
//! of typed, optionally named sections with `option` and `list` entries.

pub mod tree;
pub mod writer;

pub use tree::{is_valid_name, is_valid_type, sanitize_name, UciPackage, UciSection, UciValue};
pub use writer::{quote, write, write_all};
