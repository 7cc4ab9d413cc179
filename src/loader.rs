//! Schema loading from files and strings.

use std::path::Path;

use crate::error::SchemaError;
use crate::schema::Schema;
use crate::wire::schema_from_value;

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `SchemaError::FileNotFound` if the file doesn't exist,
/// `SchemaError::InvalidJson` if the file isn't valid JSON, or
/// `SchemaError::InvalidSchema` if the JSON doesn't spell a schema.
pub fn load_schema(path: &Path) -> Result<Schema, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `SchemaError::InvalidJson` if the string isn't valid JSON, or
/// `SchemaError::InvalidSchema` if the JSON doesn't spell a schema.
pub fn load_schema_str(content: &str) -> Result<Schema, SchemaError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|source| SchemaError::InvalidJson { source })?;
    schema_from_value(&value)
}
