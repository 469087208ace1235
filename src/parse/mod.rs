//! Parse phase: recipe JSON → Rust types.
//!
//! Failure here is the one hard stop in validation: the document is reported
//! as a single `MALFORMED_DOCUMENT` finding and no block is visited.

pub mod types;

pub use types::*;

use serde::Deserialize;
use serde_json::Value;

use crate::report::{Finding, FindingCode};

/// Deserialize a recipe JSON string into a `Recipe`.
pub fn parse(json: &str) -> Result<Recipe, Finding> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        Finding::document(
            FindingCode::MalformedDocument,
            format!("Failed to parse recipe JSON: {}", e),
            "",
        )
    })?;
    from_value(&value)
}

/// Decode an already-parsed JSON tree into a `Recipe`.
pub fn from_value(doc: &Value) -> Result<Recipe, Finding> {
    let Some(root) = doc.as_object() else {
        return Err(Finding::document(
            FindingCode::MalformedDocument,
            format!("Recipe must be a JSON object, found {}", kind_name(doc)),
            "",
        ));
    };

    match root.get("code") {
        None => {
            return Err(Finding::document(
                FindingCode::MalformedDocument,
                "Recipe has no 'code' block",
                "/code",
            ));
        }
        Some(code) if !code.is_object() => {
            return Err(Finding::document(
                FindingCode::MalformedDocument,
                format!("Recipe 'code' must be an object, found {}", kind_name(code)),
                "/code",
            ));
        }
        Some(_) => {}
    }

    Recipe::deserialize(doc).map_err(|e| {
        Finding::document(
            FindingCode::MalformedDocument,
            format!("Recipe could not be decoded: {}", e),
            "",
        )
    })
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
