//! WASM entry points for browser-based recipe editors.

use wasm_bindgen::prelude::*;

use crate::catalog::SchemaCatalog;
use crate::report::ValidationReport;

/// Validate recipe JSON against the built-in catalog.
/// Returns the serialized report (`is_valid` + `findings`).
#[wasm_bindgen]
pub fn validate_recipe(json: &str) -> JsValue {
    let report = validate_recipe_inner(json);
    serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
}

fn validate_recipe_inner(json: &str) -> ValidationReport {
    crate::validate::validate_str(json, &SchemaCatalog::builtin())
}

/// Validate recipe JSON against the built-in catalog extended with a catalog
/// file's JSON. Returns `{status: "report", ...}` or `{status: "catalog_error", message}`.
#[wasm_bindgen]
pub fn validate_recipe_with_catalog(json: &str, catalog_json: &str) -> JsValue {
    let result = validate_recipe_with_catalog_inner(json, catalog_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_recipe_with_catalog_inner(json: &str, catalog_json: &str) -> WasmResult {
    let extra = match SchemaCatalog::from_json_str(catalog_json) {
        Ok(c) => c,
        Err(e) => {
            return WasmResult::CatalogError {
                message: e.to_string(),
            };
        }
    };

    let mut catalog = SchemaCatalog::builtin();
    catalog.merge(extra);
    WasmResult::Report(crate::validate::validate_str(json, &catalog))
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum WasmResult {
    Report(ValidationReport),
    CatalogError { message: String },
}
