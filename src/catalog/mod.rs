//! Schema catalog: which operations each connector offers and which input
//! fields they require.
//!
//! The catalog is plain data, constructed explicitly and passed to the
//! validator. It is open-world: a provider or operation missing from it may
//! be a private custom connector, so absence is `Lookup::Unknown`, never an
//! error.

pub mod builtin;
pub mod file;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// VALUE KINDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    /// Must be mapped from an upstream block; literals are suspicious.
    DataPillOnly,
    Any,
}

impl ValueKind {
    /// Does a literal (non-pill, non-formula) value fit this kind?
    ///
    /// Workato coerces numeric and boolean strings, so `"42"` is an integer
    /// and `"true"` a boolean.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Any, _) => true,
            (ValueKind::DataPillOnly, _) => false,
            (ValueKind::String, Value::String(_)) => true,
            (ValueKind::Number, Value::Number(_)) => true,
            (ValueKind::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            (ValueKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueKind::Integer, Value::String(s)) => s.trim().parse::<i64>().is_ok(),
            (ValueKind::Boolean, Value::Bool(_)) => true,
            (ValueKind::Boolean, Value::String(s)) => matches!(s.trim(), "true" | "false"),
            (ValueKind::Object, Value::Object(_)) => true,
            (ValueKind::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::DataPillOnly => "data pill",
            ValueKind::Any => "any",
        };
        f.write_str(s)
    }
}

// =============================================================================
// SCHEMA ENTRIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Trigger,
    Action,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Trigger => write!(f, "trigger"),
            OperationKind::Action => write!(f, "action"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub required: bool,
}

/// One trigger or action of a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub keyword: OperationKind,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl SchemaEntry {
    pub fn trigger(name: &str) -> Self {
        SchemaEntry {
            name: name.into(),
            keyword: OperationKind::Trigger,
            fields: Vec::new(),
        }
    }

    pub fn action(name: &str) -> Self {
        SchemaEntry {
            name: name.into(),
            keyword: OperationKind::Action,
            fields: Vec::new(),
        }
    }

    pub fn required(mut self, name: &str, kind: ValueKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &str, kind: ValueKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchema {
    pub name: String,
    /// When set, operations not listed here are known not to exist.
    #[serde(default)]
    pub exhaustive: bool,
    /// Built-in utilities (logger, clock, ...) run without a connection.
    #[serde(default = "default_requires_connection")]
    pub requires_connection: bool,
    #[serde(default)]
    pub operations: Vec<SchemaEntry>,
}

fn default_requires_connection() -> bool {
    true
}

impl ProviderSchema {
    pub fn new(name: &str) -> Self {
        ProviderSchema {
            name: name.into(),
            exhaustive: false,
            requires_connection: true,
            operations: Vec::new(),
        }
    }

    pub fn exhaustive(mut self) -> Self {
        self.exhaustive = true;
        self
    }

    pub fn connectionless(mut self) -> Self {
        self.requires_connection = false;
        self
    }

    pub fn operation(mut self, entry: SchemaEntry) -> Self {
        self.upsert(entry);
        self
    }

    fn upsert(&mut self, entry: SchemaEntry) {
        match self
            .operations
            .iter_mut()
            .find(|op| op.name == entry.name && op.keyword == entry.keyword)
        {
            Some(existing) => *existing = entry,
            None => self.operations.push(entry),
        }
    }
}

// =============================================================================
// LOOKUP
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKind {
    Provider,
    Operation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The operation exists, but only as the other keyword.
    WrongKeyword { declared: OperationKind },
    /// The provider's operation list is closed and does not contain it.
    NotOffered,
}

/// Result of a catalog lookup. Three states, kept apart so that "not in the
/// catalog" is never mistaken for "invalid".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Known(&'a SchemaEntry),
    Invalid(InvalidReason),
    Unknown(UnknownKind),
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaCatalog {
    providers: BTreeMap<String, ProviderSchema>,
}

impl SchemaCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    pub fn with_provider(mut self, provider: ProviderSchema) -> Self {
        self.insert(provider);
        self
    }

    /// Add a provider, merging operations into an existing entry of the same
    /// name. Flags from the incoming provider win.
    pub fn insert(&mut self, provider: ProviderSchema) {
        match self.providers.get_mut(&provider.name) {
            Some(existing) => {
                existing.exhaustive = provider.exhaustive;
                existing.requires_connection = provider.requires_connection;
                for op in provider.operations {
                    existing.upsert(op);
                }
            }
            None => {
                self.providers.insert(provider.name.clone(), provider);
            }
        }
    }

    pub fn merge(&mut self, other: SchemaCatalog) {
        for provider in other.providers.into_values() {
            self.insert(provider);
        }
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderSchema> {
        self.providers.get(name)
    }

    /// Providers in name order.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderSchema> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn lookup(&self, provider: &str, name: &str, keyword: OperationKind) -> Lookup<'_> {
        let Some(schema) = self.providers.get(provider) else {
            return Lookup::Unknown(UnknownKind::Provider);
        };

        if let Some(entry) = schema
            .operations
            .iter()
            .find(|op| op.name == name && op.keyword == keyword)
        {
            return Lookup::Known(entry);
        }

        if let Some(other) = schema.operations.iter().find(|op| op.name == name) {
            return Lookup::Invalid(InvalidReason::WrongKeyword {
                declared: other.keyword,
            });
        }

        if schema.exhaustive {
            Lookup::Invalid(InvalidReason::NotOffered)
        } else {
            Lookup::Unknown(UnknownKind::Operation)
        }
    }

    /// Unknown providers are assumed to need a connection.
    pub fn requires_connection(&self, provider: &str) -> bool {
        self.providers
            .get(provider)
            .is_none_or(|p| p.requires_connection)
    }
}
