//! Recipe validation.
//!
//! Walks the block tree once, collecting every finding rather than stopping at
//! the first, so one run gives a recipe author the complete list of fixes.

pub mod connections;
pub mod rules;
pub mod walker;

pub use walker::Scope;

use serde_json::Value;

use crate::catalog::SchemaCatalog;
use crate::parse::{self, Recipe};
use crate::report::ValidationReport;

/// Validate an already-parsed JSON document.
pub fn validate(doc: &Value, catalog: &SchemaCatalog) -> ValidationReport {
    match parse::from_value(doc) {
        Ok(recipe) => validate_recipe(&recipe, catalog),
        Err(finding) => ValidationReport::single(finding),
    }
}

/// Validate recipe JSON text. Syntax errors become `MALFORMED_DOCUMENT`.
pub fn validate_str(json: &str, catalog: &SchemaCatalog) -> ValidationReport {
    match parse::parse(json) {
        Ok(recipe) => validate_recipe(&recipe, catalog),
        Err(finding) => ValidationReport::single(finding),
    }
}

/// Validate a decoded recipe.
pub fn validate_recipe(recipe: &Recipe, catalog: &SchemaCatalog) -> ValidationReport {
    walker::walk(recipe, catalog)
}
