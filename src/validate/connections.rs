//! Document-level check: every provider used by a block needs an entry in the
//! recipe's `config` list.

use serde_json::Value;

use crate::catalog::SchemaCatalog;
use crate::parse::ConnectionRef;
use crate::report::{Finding, FindingCode};

/// Where a provider is first used, and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUse {
    pub provider: String,
    pub first_block: String,
    pub first_pointer: String,
    pub blocks: usize,
}

/// Record a use, keeping first-use order.
pub fn record_use(uses: &mut Vec<ProviderUse>, provider: &str, block: &str, pointer: &str) {
    match uses.iter_mut().find(|u| u.provider == provider) {
        Some(existing) => existing.blocks += 1,
        None => uses.push(ProviderUse {
            provider: provider.to_string(),
            first_block: block.to_string(),
            first_pointer: pointer.to_string(),
            blocks: 1,
        }),
    }
}

fn has_account(entry: &ConnectionRef) -> bool {
    match &entry.account_id {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// One finding per uncovered provider, in first-use order. A provider is
/// covered by an entry that names a connection (`account_id`) or opts out
/// with `skip_validation`.
pub fn check_coverage(
    uses: &[ProviderUse],
    config: &[ConnectionRef],
    catalog: &SchemaCatalog,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for usage in uses {
        if !catalog.requires_connection(&usage.provider) {
            continue;
        }

        let entries: Vec<&ConnectionRef> = config
            .iter()
            .filter(|c| c.provider.as_deref() == Some(usage.provider.as_str()))
            .collect();
        if entries.iter().any(|c| c.skip_validation || has_account(c)) {
            continue;
        }

        let problem = if entries.is_empty() {
            "has no entry in 'config'"
        } else {
            "has no connection ('account_id') in 'config'"
        };
        findings.push(Finding::document(
            FindingCode::MissingConnectionConfig,
            format!(
                "Provider '{}' is used by {} block{} (first '{}' at {}) but {}",
                usage.provider,
                usage.blocks,
                if usage.blocks == 1 { "" } else { "s" },
                usage.first_block,
                usage.first_pointer,
                problem
            ),
            "/config",
        ));
    }

    findings
}
