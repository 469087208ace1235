//! Validation for Workato recipe JSON documents.
//!
//! A recipe is a tree of trigger/action blocks. `validate` walks that tree once
//! and returns every finding (numbering, aliases, required fields, connector
//! validity, data-pill references, connection coverage) in a deterministic
//! order.

pub mod catalog;
pub mod config;
pub mod error;
pub mod files;
pub mod parse;
pub mod pill;
pub mod report;
pub mod validate;
pub mod wasm;

pub use catalog::SchemaCatalog;
pub use error::{Error, Result};
pub use report::{Finding, FindingCode, Severity, ValidationReport};
pub use validate::{validate, validate_recipe, validate_str};
