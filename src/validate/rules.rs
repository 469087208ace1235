//! Per-block rules. Run in a fixed order: schema (required fields, value
//! kinds), provider validity, data-pill resolution.

use std::collections::HashSet;

use serde_json::Value;

use super::walker::{Scope, non_blank};
use crate::catalog::{
    InvalidReason, Lookup, OperationKind, SchemaCatalog, SchemaEntry, UnknownKind, ValueKind,
};
use crate::parse::{Block, Keyword, kind_name};
use crate::pill::{self, PillOutcome, escape_pointer, parser::is_dynamic};
use crate::report::{Finding, FindingCode};

pub struct BlockContext<'a> {
    pub block: &'a Block,
    pub pointer: &'a str,
    /// Aliases of blocks visited before this one.
    pub scope: &'a Scope,
    /// Every alias in the document, used only to word messages.
    pub all_aliases: &'a HashSet<&'a str>,
    pub catalog: &'a SchemaCatalog,
}

impl BlockContext<'_> {
    fn alias(&self) -> Option<String> {
        self.block.alias().map(str::to_string)
    }

    fn finding(&self, code: FindingCode, message: String, path: String) -> Finding {
        Finding::new(code, message, self.alias(), path)
    }

    fn input_path(&self, field: &str) -> String {
        format!("{}/input/{}", self.pointer, escape_pointer(field))
    }
}

/// Run every rule against one block. Returns all findings.
pub fn check_block(ctx: &BlockContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    let operation = operation_of(ctx.block);
    let lookup = operation.map(|(provider, name, kind)| ctx.catalog.lookup(provider, name, kind));

    if let Some(Lookup::Known(entry)) = lookup {
        required_fields(ctx, entry, &mut findings);
        field_kinds(ctx, entry, &mut findings);
    }
    if let (Some(operation), Some(lookup)) = (operation, lookup) {
        provider_known(ctx, operation, lookup, &mut findings);
    }
    data_pills(ctx, &mut findings);

    findings
}

fn operation_of(block: &Block) -> Option<(&str, &str, OperationKind)> {
    let kind = match block.keyword {
        Some(Keyword::Trigger) => OperationKind::Trigger,
        Some(Keyword::Action) => OperationKind::Action,
        _ => return None,
    };
    Some((non_blank(&block.provider)?, non_blank(&block.name)?, kind))
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

fn required_fields(ctx: &BlockContext<'_>, entry: &SchemaEntry, findings: &mut Vec<Finding>) {
    for spec in entry.required_fields() {
        let problem = match ctx.block.input.get(&spec.name) {
            None => "is missing",
            Some(value) if is_empty_value(value) => "is empty",
            Some(_) => continue,
        };
        findings.push(ctx.finding(
            FindingCode::MissingRequiredField,
            format!(
                "Required field '{}' {} in block '{}' ({})",
                spec.name,
                problem,
                ctx.block.label(),
                entry.name
            ),
            ctx.input_path(&spec.name),
        ));
    }
}

fn field_kinds(ctx: &BlockContext<'_>, entry: &SchemaEntry, findings: &mut Vec<Finding>) {
    let mut names: Vec<&String> = ctx.block.input.keys().collect();
    names.sort();

    for name in names {
        let Some(spec) = entry.field(name) else {
            continue;
        };
        let value = &ctx.block.input[name];
        if is_empty_value(value) || matches!(value, Value::String(s) if is_dynamic(s)) {
            continue;
        }

        let message = match spec.kind {
            ValueKind::DataPillOnly => format!(
                "Field '{}' should be mapped from a data pill, found a literal {}",
                name,
                kind_name(value)
            ),
            kind if !kind.accepts(value) => format!(
                "Field '{}' expects {}, found {}",
                name,
                kind,
                kind_name(value)
            ),
            _ => continue,
        };
        findings.push(ctx.finding(FindingCode::FieldKindMismatch, message, ctx.input_path(name)));
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

fn provider_known(
    ctx: &BlockContext<'_>,
    (provider, name, kind): (&str, &str, OperationKind),
    lookup: Lookup<'_>,
    findings: &mut Vec<Finding>,
) {
    let (code, message, field) = match lookup {
        Lookup::Known(_) => return,
        Lookup::Unknown(UnknownKind::Provider) => (
            FindingCode::UnknownProvider,
            format!(
                "Provider '{}' is not in the schema catalog; '{}' is treated as a custom connector",
                provider, name
            ),
            "provider",
        ),
        Lookup::Unknown(UnknownKind::Operation) => (
            FindingCode::UnknownProvider,
            format!(
                "The {} '{}' is not in the schema catalog for provider '{}'",
                kind, name, provider
            ),
            "name",
        ),
        Lookup::Invalid(InvalidReason::WrongKeyword { declared }) => (
            FindingCode::InvalidOperation,
            format!(
                "'{}' is a {} of provider '{}' and cannot be used as a {}",
                name, declared, provider, kind
            ),
            "keyword",
        ),
        Lookup::Invalid(InvalidReason::NotOffered) => (
            FindingCode::InvalidOperation,
            format!("Provider '{}' has no {} named '{}'", provider, kind, name),
            "name",
        ),
    };
    findings.push(ctx.finding(code, message, format!("{}/{}", ctx.pointer, field)));
}

// ---------------------------------------------------------------------------
// Data pills
// ---------------------------------------------------------------------------

fn data_pills(ctx: &BlockContext<'_>, findings: &mut Vec<Finding>) {
    for located in pill::scan_input(&ctx.block.input, ctx.pointer) {
        match located.outcome {
            PillOutcome::Reference(reference) => {
                let source = reference.source_alias.as_str();
                if ctx.scope.contains(source) {
                    continue;
                }
                let reason = if ctx.block.alias() == Some(source) {
                    "its own block".to_string()
                } else if ctx.all_aliases.contains(source) {
                    format!("block '{}', which runs after this block", source)
                } else {
                    format!("unknown block alias '{}'", source)
                };
                findings.push(ctx.finding(
                    FindingCode::UnresolvedDataPillReference,
                    format!("Data pill '{}' refers to {}", reference, reason),
                    located.pointer,
                ));
            }
            PillOutcome::Other { .. } => {}
            PillOutcome::Malformed(malformed) => {
                findings.push(ctx.finding(
                    FindingCode::MalformedDataPill,
                    format!("{}: {}", malformed.message, malformed.snippet),
                    located.pointer,
                ));
            }
        }
    }
}
