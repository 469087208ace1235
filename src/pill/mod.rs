//! Data-pill references: how a block's input points at an upstream block's
//! output.
//!
//! Two syntaxes appear in recipe inputs:
//!
//! - interpolation, embedded in literal text:
//!   `Hello #{_dp('data.salesforce.step1.Name')}!`
//! - formula, where the whole value is an expression starting with `=`:
//!   `=_dp('{"pill_type":"output","provider":"salesforce","line":"step1","path":["Name"]}').upcase`
//!
//! The argument of `_dp(...)` (or the legacy `_(...)`) is either a dotted
//! `data.<provider>.<alias>.<field...>` path or a JSON pill object. Both forms
//! are accepted in both syntaxes.

pub mod parser;

pub use parser::{contains_pill, parse_str};

use serde::Serialize;
use serde_json::Value;

use crate::parse::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxForm {
    Interpolation,
    Formula,
}

impl std::fmt::Display for SyntaxForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxForm::Interpolation => write!(f, "interpolation"),
            SyntaxForm::Formula => write!(f, "formula"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A reference to an upstream block's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataPillRef {
    pub provider: Option<String>,
    pub source_alias: String,
    pub field_path: Vec<PathSegment>,
    pub syntax_form: SyntaxForm,
}

impl std::fmt::Display for DataPillRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "data.{}.{}",
            self.provider.as_deref().unwrap_or("?"),
            self.source_alias
        )?;
        for segment in &self.field_path {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedPill {
    pub message: String,
    /// The offending source text, truncated for display.
    pub snippet: String,
}

/// Result of decoding one `_dp(...)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PillOutcome {
    Reference(DataPillRef),
    /// Pills that do not point at a block (lookup tables, properties, ...).
    Other { pill_type: String },
    Malformed(MalformedPill),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedPill {
    /// JSON pointer to the string value holding the pill.
    pub pointer: String,
    pub outcome: PillOutcome,
}

/// Find every pill in an input value, recursing through arrays and objects.
/// Object keys are visited in sorted order so results never depend on the
/// key order of the source document.
pub fn scan(value: &Value, pointer: &str) -> Vec<LocatedPill> {
    let mut out = Vec::new();
    scan_into(value, pointer.to_string(), &mut out);
    out
}

fn scan_into(value: &Value, pointer: String, out: &mut Vec<LocatedPill>) {
    match value {
        Value::String(s) => {
            out.extend(parse_str(s).into_iter().map(|outcome| LocatedPill {
                pointer: pointer.clone(),
                outcome,
            }));
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                scan_into(item, format!("{}/{}", pointer, i), out);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                scan_into(&map[key], format!("{}/{}", pointer, escape_pointer(key)), out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Every pill in a block's `input`, located relative to `block_pointer`.
pub fn scan_input(input: &serde_json::Map<String, Value>, block_pointer: &str) -> Vec<LocatedPill> {
    let mut out = Vec::new();
    let mut keys: Vec<&String> = input.keys().collect();
    keys.sort();
    for key in keys {
        scan_into(
            &input[key],
            format!("{}/input/{}", block_pointer, escape_pointer(key)),
            &mut out,
        );
    }
    out
}

/// Every pill in the recipe, in block execution order.
pub fn scan_recipe(recipe: &Recipe) -> Vec<(Option<String>, LocatedPill)> {
    recipe
        .blocks()
        .into_iter()
        .flat_map(|(pointer, block)| {
            let alias = block.alias().map(str::to_string);
            scan_input(&block.input, &pointer)
                .into_iter()
                .map(move |pill| (alias.clone(), pill))
        })
        .collect()
}

/// RFC 6901 escaping for a single pointer token.
pub fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
