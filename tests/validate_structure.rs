//! Integration tests for structural rules: root trigger, numbering, aliases,
//! block fields, and whole-report properties.

mod helpers;

use helpers::*;
use recipe_validator::{FindingCode, SchemaCatalog, validate, validate_str};
use serde_json::json;

fn builtin() -> SchemaCatalog {
    SchemaCatalog::builtin()
}

#[test]
fn account_sync_fixture_is_clean() {
    let report = validate_str(include_str!("fixtures/account_sync.json"), &builtin());
    assert!(report.is_valid());
    assert!(report.findings().is_empty(), "Expected no findings, got: {:#?}", report.findings());
}

#[test]
fn root_action_is_not_a_trigger() {
    let doc = recipe(json!({ "keyword": "action", "number": 0, "as": "x" }), vec![]);
    let report = validate(&doc, &builtin());
    assert!(!report.is_valid());
    assert_eq!(paths_for(&report, FindingCode::RootNotTrigger), vec!["/code/keyword"]);
}

#[test]
fn numbering_gap_is_reported_on_the_child() {
    let doc = recipe(trigger(vec![log(2, "step", "hello")]), vec![]);
    let report = validate(&doc, &builtin());
    assert!(!report.is_valid());
    let gaps: Vec<_> = report
        .findings()
        .iter()
        .filter(|f| f.code == FindingCode::NonSequentialNumbering)
        .collect();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].block_as.as_deref(), Some("step"));
    assert_eq!(gaps[0].path, "/code/block/0/number");
    assert!(gaps[0].message.contains("expected 1"));
}

#[test]
fn counting_resumes_after_a_gap() {
    let doc = recipe(
        trigger(vec![log(2, "a", "x"), log(3, "b", "y"), log(4, "c", "z")]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(report.count(FindingCode::NonSequentialNumbering), 1);
}

#[test]
fn nested_blocks_follow_pre_order_numbering() {
    let doc = recipe(
        trigger(vec![
            control(1, "if", "check", vec![log(2, "inner_a", "a"), log(3, "inner_b", "b")]),
            control(4, "else", "otherwise", vec![log(5, "inner_c", "c")]),
            log(6, "after", "done"),
        ]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert!(report.findings().is_empty(), "Unexpected findings: {:#?}", report.findings());
}

#[test]
fn sibling_numbered_like_a_child_is_flagged() {
    // The second sibling restarts at 2 even though block 2 was already used inside the if.
    let doc = recipe(
        trigger(vec![
            control(1, "if", "check", vec![log(2, "inner", "a")]),
            log(2, "after", "b"),
        ]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(
        paths_for(&report, FindingCode::NonSequentialNumbering),
        vec!["/code/block/1/number"]
    );
}

#[test]
fn missing_number_is_a_missing_block_field() {
    let mut child = log(1, "step", "x");
    child.as_object_mut().unwrap().remove("number");
    let report = validate(&recipe(trigger(vec![child]), vec![]), &builtin());
    assert_eq!(
        paths_for(&report, FindingCode::MissingBlockField),
        vec!["/code/block/0/number"]
    );
    assert!(!report.has(FindingCode::NonSequentialNumbering));
}

#[test]
fn every_repeated_alias_is_reported() {
    let doc = recipe(
        trigger(vec![log(1, "dup", "a"), log(2, "dup", "b"), log(3, "dup", "c")]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(
        paths_for(&report, FindingCode::DuplicateAlias),
        vec!["/code/block/1/as", "/code/block/2/as"]
    );
}

#[test]
fn reusing_the_trigger_alias_is_a_duplicate() {
    let doc = recipe(trigger(vec![log(1, "tick", "a")]), vec![]);
    let report = validate(&doc, &builtin());
    assert_eq!(report.count(FindingCode::DuplicateAlias), 1);
}

#[test]
fn missing_alias_is_a_missing_block_field() {
    let mut child = log(1, "step", "x");
    child.as_object_mut().unwrap().insert("as".into(), json!("  "));
    let report = validate(&recipe(trigger(vec![child]), vec![]), &builtin());
    assert_eq!(paths_for(&report, FindingCode::MissingBlockField), vec!["/code/block/0/as"]);
}

#[test]
fn nested_trigger_skips_its_own_rules_but_keeps_its_alias() {
    let nested = json!({
        "number": 1,
        "keyword": "trigger",
        "provider": "salesforce",
        "name": "new_sobject",
        "as": "inner",
        "input": {},
    });
    let doc = recipe(
        trigger(vec![nested, log(2, "after", &pill("salesforce", "inner", "Id"))]),
        vec![connection("salesforce")],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(paths_for(&report, FindingCode::NestedTrigger), vec!["/code/block/0/keyword"]);
    assert!(!report.has(FindingCode::MissingRequiredField));
    assert!(!report.has(FindingCode::UnresolvedDataPillReference));
}

#[test]
fn unknown_keyword_is_reported() {
    let doc = recipe(trigger(vec![control(1, "teleport", "beam", vec![])]), vec![]);
    let report = validate(&doc, &builtin());
    assert_eq!(paths_for(&report, FindingCode::UnknownKeyword), vec!["/code/block/0/keyword"]);
    assert!(!report.is_valid());
}

#[test]
fn action_without_provider_or_name() {
    let doc = recipe(
        trigger(vec![json!({ "number": 1, "keyword": "action", "as": "bare", "input": {} })]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(
        paths_for(&report, FindingCode::MissingBlockField),
        vec!["/code/block/0/provider", "/code/block/0/name"]
    );
}

#[test]
fn wrong_typed_fields_are_reported_once_each() {
    let mut bad_alias = log(1, "a", "x");
    bad_alias["as"] = json!(5);
    let mut bad_keyword = log(2, "b", "x");
    bad_keyword["keyword"] = json!(7);
    let mut bad_input = log(3, "c", "x");
    bad_input["input"] = json!("x");
    let doc = recipe(
        trigger(vec![bad_alias, bad_keyword, bad_input, json!("oops"), log(4, "d", "x")]),
        vec![],
    );
    let report = validate(&doc, &builtin());
    assert_eq!(
        paths_for(&report, FindingCode::MissingBlockField),
        vec![
            "/code/block/0/as",
            "/code/block/1/keyword",
            "/code/block/2/input",
            "/code/block/3",
        ]
    );
    // The empty input still misses its required field.
    assert_eq!(
        paths_for(&report, FindingCode::MissingRequiredField),
        vec!["/code/block/2/input/message"]
    );
    // A non-object child takes no number.
    assert!(!report.has(FindingCode::NonSequentialNumbering));
    assert!(!report.has(FindingCode::MalformedDocument));
}

#[test]
fn non_object_document_is_a_single_malformed_finding() {
    for json in ["[]", "42", "{\"code\": []}", "{ not json"] {
        let report = validate_str(json, &builtin());
        assert!(!report.is_valid(), "{} should be invalid", json);
        assert_eq!(report.findings().len(), 1, "{}: {:?}", json, report.findings());
        assert_eq!(report.findings()[0].code, FindingCode::MalformedDocument);
    }
}

#[test]
fn validation_is_idempotent() {
    let json = include_str!("fixtures/broken_recipe.json");
    let catalog = builtin();
    assert_eq!(validate_str(json, &catalog), validate_str(json, &catalog));
}

#[test]
fn key_order_does_not_change_the_report() {
    let forward = r##"{"name":"r","code":{"number":0,"keyword":"trigger","provider":"clock",
        "name":"scheduled_event","as":"tick","input":{},"block":[
        {"number":2,"keyword":"action","provider":"logger","name":"log_message","as":"log",
         "input":{"message":"#{_dp('data.logger.nope.x')}","user_logger":"maybe"}}]},"config":[]}"##;
    let reversed = r##"{"config":[],"code":{"block":[
        {"input":{"user_logger":"maybe","message":"#{_dp('data.logger.nope.x')}"},"as":"log",
         "name":"log_message","provider":"logger","keyword":"action","number":2}],
        "input":{},"as":"tick","name":"scheduled_event","provider":"clock","keyword":"trigger",
        "number":0},"name":"r"}"##;
    let catalog = builtin();
    let a = validate_str(forward, &catalog);
    let b = validate_str(reversed, &catalog);
    assert_eq!(a, b);
    assert_eq!(a.findings().len(), 3);
}

#[test]
fn findings_follow_visit_order() {
    let report = validate_str(include_str!("fixtures/broken_recipe.json"), &builtin());
    assert_eq!(
        codes(&report),
        vec![
            FindingCode::NonSequentialNumbering,
            FindingCode::UnresolvedDataPillReference,
            FindingCode::DuplicateAlias,
            FindingCode::MissingRequiredField,
            FindingCode::MalformedDataPill,
            FindingCode::MissingConnectionConfig,
        ]
    );
}
