//! Rust types mirroring the exported Workato recipe JSON.
//!
//! Decoding is lenient: fields whose absence or wrong type is a validation
//! finding (`as`, `number`, `provider`, ...) are optional here so one bad block
//! does not turn the whole document into a parse failure. Fields the platform
//! adds that validation does not look at (`extended_input_schema`, `skip`,
//! `visible_config_fields`, ...) are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::kind_name;

// =============================================================================
// TOP-LEVEL RECIPE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    pub code: Block,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: Vec<ConnectionRef>,
}

impl Recipe {
    /// All blocks in execution (pre-order) order, paired with their JSON pointer.
    pub fn blocks(&self) -> Vec<(String, &Block)> {
        let mut out = Vec::new();
        collect_blocks(&self.code, "/code".to_string(), &mut out);
        out
    }
}

fn collect_blocks<'a>(block: &'a Block, pointer: String, out: &mut Vec<(String, &'a Block)>) {
    let children = &block.block;
    out.push((pointer.clone(), block));
    for (i, child) in children.iter().enumerate() {
        collect_blocks(child, format!("{}/block/{}", pointer, i), out);
    }
}

/// An entry in the recipe's `config` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRef {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    /// Opaque pointer at a connection; an object in exports, a string in
    /// hand-written manifests.
    #[serde(default)]
    pub account_id: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skip_validation: bool,
}

// =============================================================================
// BLOCKS
// =============================================================================

/// One block of the recipe tree.
///
/// Decoded from a raw JSON value one field at a time, so a field of the wrong
/// type is recorded in `field_errors` instead of failing the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Block {
    pub number: Option<u64>,
    pub provider: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "as")]
    pub alias: Option<String>,
    pub keyword: Option<Keyword>,
    pub input: Map<String, Value>,
    pub block: Vec<Block>,
    pub uuid: Option<String>,
    #[serde(skip)]
    pub field_errors: Vec<FieldError>,
}

/// A block, or one of its fields, present with the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The block itself is not a JSON object.
    NotAnObject { found: &'static str },
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Block {
                field_errors: vec![FieldError::NotAnObject {
                    found: kind_name(&value),
                }],
                ..Block::default()
            };
        };

        let mut errors = Vec::new();
        let mut take = |field: &'static str, expected: &'static str, fits: fn(&Value) -> bool| {
            match fields.remove(field) {
                None | Some(Value::Null) => None,
                Some(v) if fits(&v) => Some(v),
                Some(v) => {
                    errors.push(FieldError::WrongType {
                        field,
                        expected,
                        found: kind_name(&v),
                    });
                    None
                }
            }
        };

        let number = take("number", "a non-negative integer", |v| v.is_u64())
            .and_then(|v| v.as_u64());
        let provider = take("provider", "a string", Value::is_string).and_then(into_string);
        let name = take("name", "a string", Value::is_string).and_then(into_string);
        let alias = take("as", "a string", Value::is_string).and_then(into_string);
        let keyword = take("keyword", "a string", Value::is_string)
            .and_then(into_string)
            .map(Keyword::from);
        let uuid = take("uuid", "a string", Value::is_string).and_then(into_string);
        let input = match take("input", "an object", Value::is_object) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let block = match take("block", "an array", Value::is_array) {
            Some(Value::Array(children)) => children.into_iter().map(Block::from).collect(),
            _ => Vec::new(),
        };

        Block {
            number,
            provider,
            name,
            alias,
            keyword,
            input,
            block,
            uuid,
            field_errors: errors,
        }
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

impl Block {
    /// The alias, if present and non-blank.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self.keyword, Some(Keyword::Trigger))
    }

    /// Trigger and action blocks talk to a connector; control blocks do not.
    pub fn is_operation(&self) -> bool {
        matches!(self.keyword, Some(Keyword::Trigger | Keyword::Action))
    }

    /// Was `field` present with the wrong type?
    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_errors
            .iter()
            .any(|e| matches!(e, FieldError::WrongType { field: f, .. } if *f == field))
    }

    pub fn is_object(&self) -> bool {
        !self
            .field_errors
            .iter()
            .any(|e| matches!(e, FieldError::NotAnObject { .. }))
    }

    /// Short human label used in messages: the alias, or the number.
    pub fn label(&self) -> String {
        match (self.alias(), self.number) {
            (Some(a), _) => a.to_string(),
            (None, Some(n)) => format!("#{}", n),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

// =============================================================================
// KEYWORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Keyword {
    Trigger,
    Action,
    Control(ControlKeyword),
    /// Anything the validator does not recognise, kept verbatim for reporting.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKeyword {
    If,
    Elsif,
    Else,
    Foreach,
    Repeat,
    WhileCondition,
    Try,
    Catch,
    Stop,
}

impl ControlKeyword {
    pub const ALL: [ControlKeyword; 9] = [
        ControlKeyword::If,
        ControlKeyword::Elsif,
        ControlKeyword::Else,
        ControlKeyword::Foreach,
        ControlKeyword::Repeat,
        ControlKeyword::WhileCondition,
        ControlKeyword::Try,
        ControlKeyword::Catch,
        ControlKeyword::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKeyword::If => "if",
            ControlKeyword::Elsif => "elsif",
            ControlKeyword::Else => "else",
            ControlKeyword::Foreach => "foreach",
            ControlKeyword::Repeat => "repeat",
            ControlKeyword::WhileCondition => "while_condition",
            ControlKeyword::Try => "try",
            ControlKeyword::Catch => "catch",
            ControlKeyword::Stop => "stop",
        }
    }
}

impl Keyword {
    pub fn as_str(&self) -> &str {
        match self {
            Keyword::Trigger => "trigger",
            Keyword::Action => "action",
            Keyword::Control(c) => c.as_str(),
            Keyword::Other(s) => s,
        }
    }
}

impl From<String> for Keyword {
    fn from(s: String) -> Self {
        if s == "trigger" {
            return Keyword::Trigger;
        }
        if s == "action" {
            return Keyword::Action;
        }
        match ControlKeyword::ALL.iter().copied().find(|c| c.as_str() == s) {
            Some(c) => Keyword::Control(c),
            None => Keyword::Other(s),
        }
    }
}

impl From<Keyword> for String {
    fn from(k: Keyword) -> Self {
        k.as_str().to_string()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exports write `null` for empty lists and maps as often as they omit them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_from_string() {
        assert_eq!(Keyword::from("trigger".to_string()), Keyword::Trigger);
        assert_eq!(
            Keyword::from("while_condition".to_string()),
            Keyword::Control(ControlKeyword::WhileCondition)
        );
        assert_eq!(
            Keyword::from("loop".to_string()),
            Keyword::Other("loop".into())
        );
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let block: Block = serde_json::from_value(serde_json::json!({
            "number": 0,
            "keyword": "trigger",
            "provider": "clock",
            "name": "scheduled_event",
            "as": "trigger",
            "input": null,
            "block": null
        }))
        .unwrap();
        assert!(block.input.is_empty());
        assert!(block.block.is_empty());
        assert!(block.is_trigger());
    }

    #[test]
    fn blank_alias_is_absent() {
        let block: Block =
            serde_json::from_value(serde_json::json!({ "keyword": "action", "as": "  " })).unwrap();
        assert_eq!(block.alias(), None);
        assert_eq!(block.label(), "<unnamed>");
    }

    #[test]
    fn float_number_is_a_wrong_type() {
        let block: Block =
            serde_json::from_value(serde_json::json!({ "number": 1.0, "as": "a" })).unwrap();
        assert_eq!(block.number, None);
        assert_eq!(
            block.field_errors,
            vec![FieldError::WrongType {
                field: "number",
                expected: "a non-negative integer",
                found: "number",
            }]
        );
        assert!(block.is_object());
    }

    #[test]
    fn serializes_without_field_errors() {
        let block = Block::from(serde_json::json!({ "number": "1", "as": "a" }));
        let out = serde_json::to_value(&block).unwrap();
        assert_eq!(out["as"], "a");
        assert!(out.get("field_errors").is_none());
    }
}
