//! Schema validation for NetJSON DeviceConfiguration documents.

use serde_json::{Map, Value};

use crate::error::BackendError;

const SCHEMA: &str = include_str!("schema.json");

/// The embedded JSON Schema the backend validates against.
pub fn schema() -> Result<Value, BackendError> {
    serde_json::from_str(SCHEMA).map_err(|err| BackendError::Schema(err.to_string()))
}

/// Validate `config` against the embedded schema.
///
/// The first violation is reported together with the JSON pointer of the
/// offending value. The document is only read.
pub fn validate(config: &Map<String, Value>) -> Result<(), BackendError> {
    let schema = schema()?;
    let validator =
        jsonschema::validator_for(&schema).map_err(|err| BackendError::Schema(err.to_string()))?;

    let instance = Value::Object(config.clone());
    let first = validator.iter_errors(&instance).next().map(|err| {
        (err.to_string(), err.instance_path.to_string())
    });
    match first {
        Some((message, path)) => Err(BackendError::Validation { message, path }),
        None => Ok(()),
    }
}
