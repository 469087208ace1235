//! Depth-first, pre-order traversal of the block tree.
//!
//! Traversal state is the set of aliases visited so far (what a later block
//! may reference) and the number the next block must carry. Numbering is
//! the global pre-order sequence: a first child is its parent + 1, and every
//! block is the previously visited block + 1.

use std::collections::HashSet;

use super::connections::{self, ProviderUse};
use super::rules::{self, BlockContext};
use crate::catalog::SchemaCatalog;
use crate::parse::{Block, FieldError, Keyword, Recipe};
use crate::report::{Finding, FindingCode, ReportBuilder, ValidationReport};

/// Aliases of already-visited blocks.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    aliases: HashSet<String>,
}

impl Scope {
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    pub fn insert(&mut self, alias: &str) {
        self.aliases.insert(alias.to_string());
    }
}

struct Walker<'a> {
    catalog: &'a SchemaCatalog,
    all_aliases: HashSet<&'a str>,
    scope: Scope,
    next_number: u64,
    providers: Vec<ProviderUse>,
    report: ReportBuilder,
}

pub fn walk(recipe: &Recipe, catalog: &SchemaCatalog) -> ValidationReport {
    let all_aliases = recipe
        .blocks()
        .into_iter()
        .filter_map(|(_, block)| block.alias())
        .collect();

    let mut walker = Walker {
        catalog,
        all_aliases,
        scope: Scope::default(),
        next_number: 0,
        providers: Vec::new(),
        report: ReportBuilder::default(),
    };

    if !recipe.code.is_trigger() {
        let found = recipe
            .code
            .keyword
            .as_ref()
            .map_or("<missing>", |k| k.as_str());
        walker.report.push(Finding::new(
            FindingCode::RootNotTrigger,
            format!("Root block must be a trigger, found keyword '{}'", found),
            recipe.code.alias().map(str::to_string),
            "/code/keyword",
        ));
    }

    walker.visit(&recipe.code, "/code", true);

    let Walker {
        providers,
        mut report,
        ..
    } = walker;
    report.extend(connections::check_coverage(
        &providers,
        &recipe.config,
        catalog,
    ));

    let report = report.finish();
    tracing::debug!(
        recipe = recipe.name.as_deref().unwrap_or("<unnamed>"),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated recipe"
    );
    report
}

impl<'a> Walker<'a> {
    fn visit(&mut self, block: &'a Block, pointer: &str, is_root: bool) {
        let before = self.report.len();
        let alias = block.alias().map(str::to_string);
        let label = block.label();

        for error in &block.field_errors {
            match error {
                FieldError::NotAnObject { found } => self.push(
                    FindingCode::MissingBlockField,
                    format!("Block must be a JSON object, found {}", found),
                    &None,
                    pointer.to_string(),
                ),
                FieldError::WrongType {
                    field,
                    expected,
                    found,
                } => self.push(
                    FindingCode::MissingBlockField,
                    format!(
                        "Block '{}' field '{}' must be {}, found {}",
                        label, field, expected, found
                    ),
                    &alias,
                    format!("{}/{}", pointer, field),
                ),
            }
        }
        // Nothing else to check on a block that is not an object, and it holds
        // no place in the numbering.
        if !block.is_object() {
            return;
        }

        // Nested triggers are fatal for the block itself only.
        let nested_trigger = !is_root && block.is_trigger();
        if nested_trigger {
            self.push(
                FindingCode::NestedTrigger,
                format!(
                    "Block '{}' is a trigger nested inside another block; only the root may be a trigger",
                    label
                ),
                &alias,
                format!("{}/keyword", pointer),
            );
        }

        match &block.keyword {
            None if block.has_field_error("keyword") => {}
            None => self.push(
                FindingCode::MissingBlockField,
                format!("Block '{}' has no 'keyword'", label),
                &alias,
                format!("{}/keyword", pointer),
            ),
            Some(Keyword::Other(keyword)) => self.push(
                FindingCode::UnknownKeyword,
                format!("Block '{}' has unknown keyword '{}'", label, keyword),
                &alias,
                format!("{}/keyword", pointer),
            ),
            Some(_) => {}
        }

        self.check_number(block, &label, &alias, pointer);
        self.check_alias(block, &label, &alias, pointer);

        if block.is_operation() {
            for (field, value) in [("provider", &block.provider), ("name", &block.name)] {
                if non_blank(value).is_none() && !block.has_field_error(field) {
                    self.push(
                        FindingCode::MissingBlockField,
                        format!("{} block '{}' has no '{}'", operation_label(block), label, field),
                        &alias,
                        format!("{}/{}", pointer, field),
                    );
                }
            }
        }

        if !nested_trigger {
            let ctx = BlockContext {
                block,
                pointer,
                scope: &self.scope,
                all_aliases: &self.all_aliases,
                catalog: self.catalog,
            };
            let findings = rules::check_block(&ctx);
            self.report.extend(findings);
        }

        if block.is_operation() {
            if let Some(provider) = non_blank(&block.provider) {
                connections::record_use(&mut self.providers, provider, &label, pointer);
            }
        }

        if let Some(a) = &alias {
            self.scope.insert(a);
        }

        tracing::debug!(
            pointer,
            alias = alias.as_deref().unwrap_or("-"),
            findings = self.report.len() - before,
            "visited block"
        );

        for (i, child) in block.block.iter().enumerate() {
            self.visit(child, &format!("{}/block/{}", pointer, i), false);
        }
    }

    fn check_number(&mut self, block: &Block, label: &str, alias: &Option<String>, pointer: &str) {
        let expected = self.next_number;
        match block.number {
            Some(n) if n == expected => {}
            // Already reported as a wrong type; count it as the expected number.
            None if block.has_field_error("number") => {}
            Some(n) => self.push(
                FindingCode::NonSequentialNumbering,
                format!("Block '{}' is numbered {}, expected {}", label, n, expected),
                alias,
                format!("{}/number", pointer),
            ),
            None => self.push(
                FindingCode::MissingBlockField,
                format!("Block '{}' has no 'number' (expected {})", label, expected),
                alias,
                format!("{}/number", pointer),
            ),
        }
        // Continue counting from the stated number so one gap is reported once.
        self.next_number = block.number.unwrap_or(expected).saturating_add(1);
    }

    fn check_alias(&mut self, block: &Block, label: &str, alias: &Option<String>, pointer: &str) {
        match block.alias() {
            Some(a) if self.scope.contains(a) => self.push(
                FindingCode::DuplicateAlias,
                format!("Alias '{}' is already used by an earlier block", a),
                alias,
                format!("{}/as", pointer),
            ),
            Some(_) => {}
            None if block.has_field_error("as") => {}
            None => self.push(
                FindingCode::MissingBlockField,
                format!("Block '{}' has no 'as' alias", label),
                alias,
                format!("{}/as", pointer),
            ),
        }
    }

    fn push(&mut self, code: FindingCode, message: String, alias: &Option<String>, path: String) {
        self.report
            .push(Finding::new(code, message, alias.clone(), path));
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn operation_label(block: &Block) -> &'static str {
    if block.is_trigger() { "Trigger" } else { "Action" }
}
