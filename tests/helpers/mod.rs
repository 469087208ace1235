#![allow(dead_code)]

use recipe_validator::catalog::{ProviderSchema, SchemaCatalog, SchemaEntry, ValueKind};
use recipe_validator::{FindingCode, ValidationReport};
use serde_json::{Value, json};

// =============================================================================
// Recipe builders
// =============================================================================

/// Scheduled clock trigger aliased `tick`, with the given children.
pub fn trigger(children: Vec<Value>) -> Value {
    json!({
        "number": 0,
        "keyword": "trigger",
        "provider": "clock",
        "name": "scheduled_event",
        "as": "tick",
        "input": { "time_unit": "minutes", "trigger_every": "5" },
        "block": children,
    })
}

pub fn action(number: u64, provider: &str, name: &str, alias: &str, input: Value) -> Value {
    json!({
        "number": number,
        "keyword": "action",
        "provider": provider,
        "name": name,
        "as": alias,
        "input": input,
    })
}

/// Logger action; connectionless and needs only `message`.
pub fn log(number: u64, alias: &str, message: &str) -> Value {
    action(number, "logger", "log_message", alias, json!({ "message": message }))
}

pub fn control(number: u64, keyword: &str, alias: &str, children: Vec<Value>) -> Value {
    json!({
        "number": number,
        "keyword": keyword,
        "as": alias,
        "input": {},
        "block": children,
    })
}

pub fn recipe(code: Value, config: Vec<Value>) -> Value {
    json!({
        "name": "Test recipe",
        "version": 1,
        "code": code,
        "config": config,
    })
}

pub fn connection(provider: &str) -> Value {
    json!({
        "keyword": "application",
        "provider": provider,
        "skip_validation": false,
        "account_id": { "zip_name": format!("{provider}_account.connection.json"), "name": provider },
    })
}

pub fn skipped_connection(provider: &str) -> Value {
    json!({
        "keyword": "application",
        "provider": provider,
        "skip_validation": true,
        "account_id": null,
    })
}

/// `#{_dp('data.<provider>.<alias>.<path>')}`
pub fn pill(provider: &str, alias: &str, path: &str) -> String {
    format!("#{{_dp('data.{provider}.{alias}.{path}')}}")
}

/// `=_dp('{"pill_type":"output",...}')`
pub fn formula_pill(provider: &str, alias: &str, path: &[&str]) -> String {
    let payload = json!({
        "pill_type": "output",
        "provider": provider,
        "line": alias,
        "path": path,
    });
    format!("=_dp('{}')", payload)
}

// =============================================================================
// Catalogs
// =============================================================================

/// Small catalog independent of the built-in connector list.
pub fn acme_catalog() -> SchemaCatalog {
    SchemaCatalog::empty()
        .with_provider(
            ProviderSchema::new("clock")
                .exhaustive()
                .connectionless()
                .operation(SchemaEntry::trigger("scheduled_event")),
        )
        .with_provider(
            ProviderSchema::new("acme")
                .exhaustive()
                .operation(SchemaEntry::trigger("new_order").optional("region", ValueKind::String))
                .operation(
                    SchemaEntry::action("ship_order")
                        .required("order_id", ValueKind::String)
                        .optional("priority", ValueKind::Integer)
                        .optional("express", ValueKind::Boolean),
                ),
        )
}

// =============================================================================
// Report helpers
// =============================================================================

pub fn codes(report: &ValidationReport) -> Vec<FindingCode> {
    report.findings().iter().map(|f| f.code).collect()
}

pub fn paths_for(report: &ValidationReport, code: FindingCode) -> Vec<String> {
    report
        .findings()
        .iter()
        .filter(|f| f.code == code)
        .map(|f| f.path.clone())
        .collect()
}
