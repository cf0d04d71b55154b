use thiserror::Error;

/// Errors raised while building, validating or rendering a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configuration root is not a JSON object.
    #[error("config must be a JSON object, found {found}")]
    Type { found: &'static str },
    /// A bridge lists only wireless members, so no network-level
    /// representative can be picked.
    #[error("bridge '{bridge}' has no non-wireless member to serve as representative")]
    Index { bridge: String },
    /// The configuration does not conform to the embedded schema.
    #[error("invalid configuration at '{path}': {message}")]
    Validation { message: String, path: String },
    /// A renderer could not map a value onto a UCI option.
    #[error("cannot render {section}: {message}")]
    Render { section: String, message: String },
    /// The embedded schema itself could not be loaded or compiled.
    #[error("failed to load embedded schema: {0}")]
    Schema(String),
    #[error("failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),
}
