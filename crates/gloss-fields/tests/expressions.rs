/*
 * expressions.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! End-to-end tests for field expressions, conditionals and assignments.

use gloss_entry::{Entry, EntryArena, EntryId};
use gloss_fields::{
    AssignmentPipeline, Error, EvalContext, FieldEnv, parse_condition, parse_expression,
};

fn glossary() -> EntryArena {
    let mut arena = EntryArena::new();
    for entry in [
        Entry::new("fruit", "index").with_field("name", "fruit"),
        Entry::new("apple", "entry")
            .with_parent("fruit")
            .with_field("name", "apple")
            .with_field("description", "short"),
        Entry::new("durian", "entry")
            .with_parent("fruit")
            .with_field("name", "durian")
            .with_field("description", "a large and pungent fruit"),
        Entry::new("nameless", "entry").with_field("description", "no name at all"),
    ] {
        arena.insert(entry).unwrap();
    }
    arena
}

fn id(arena: &EntryArena, label: &str) -> EntryId {
    arena.lookup(label).unwrap()
}

fn holds(arena: &EntryArena, condition: &str, label: &str) -> bool {
    let env = FieldEnv::default();
    let condition = parse_condition(condition).unwrap();
    let mut ctx = EvalContext::new(arena, &env);
    condition.evaluate(&mut ctx, id(arena, label))
}

// ============================================================================
// Assignments
// ============================================================================

#[test]
fn test_first_uc_assignment_skips_null() {
    let mut arena = glossary();
    let pipeline = AssignmentPipeline::parse(r"display = \FIRSTUC{name}").unwrap();
    let report = pipeline.run(&mut arena, &FieldEnv::default());

    let display = |label: &str| {
        arena
            .get(id(&arena, label))
            .field("display")
            .map(|m| m.to_source())
    };
    assert_eq!(display("apple").as_deref(), Some("Apple"));
    assert_eq!(display("nameless"), None);
    assert_eq!(report.written, 3);
    assert_eq!(report.null, 1);
}

#[test]
fn test_assignment_reads_parent_fields() {
    let mut arena = glossary();
    let pipeline =
        AssignmentPipeline::parse(r#"see = \UC{parent -> name} + ": " + name [parent <> \NULL]"#)
            .unwrap();
    pipeline.run(&mut arena, &FieldEnv::default());

    let see = arena.get(id(&arena, "durian")).field("see").unwrap();
    assert_eq!(see.to_source(), "FRUIT: durian");
    assert!(!arena.get(id(&arena, "fruit")).has_field("see"));
}

#[test]
fn test_assignment_with_match_groups() {
    let mut arena = EntryArena::new();
    let entry = arena
        .insert(Entry::new("x", "entry").with_field("name", "Smith, John"))
        .unwrap();
    let pipeline =
        AssignmentPipeline::parse(r#"sort = \MGP{2} + " " + \MGP{1} [name = /(\w+), (\w+)/]"#)
            .unwrap();
    pipeline.run(&mut arena, &FieldEnv::default());
    assert_eq!(
        arena.get(entry).field("sort").unwrap().to_source(),
        "John Smith"
    );
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_length_condition() {
    let arena = glossary();
    assert!(!holds(&arena, r"\LEN{description} > 10", "apple"));
    assert!(holds(&arena, r"\LEN{description} > 10", "durian"));
    assert!(!holds(&arena, r"\LEN{description} > 10", "fruit"));
}

#[test]
fn test_entry_type_and_root() {
    let arena = glossary();
    assert!(holds(&arena, r#"entrytype -> original = "entry""#, "apple"));
    assert!(holds(&arena, r#"root -> name = "fruit""#, "apple"));
    // A top-level entry has no root to read from.
    assert!(holds(&arena, r"root -> name = \NULL", "fruit"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_error_display() {
    let err = parse_expression(r"\UC name").unwrap_err();
    let Error::Syntax(syntax) = &err else {
        panic!("expected syntax error, got {:?}", err);
    };
    assert_eq!(syntax.message, r"Expected '{' after \UC");
    assert_eq!(syntax.fragment, "n");

    let err = parse_condition("name ~ other").unwrap_err();
    let display = err.to_string();
    assert!(
        display.contains("Expected a comparison operator"),
        "Got: {}",
        display
    );
    assert!(display.contains("after 'name'"), "Got: {}", display);
}

#[test]
fn test_syntax_error_render() {
    let err = parse_condition("name = ").unwrap_err();
    let Error::Syntax(syntax) = err else {
        panic!("expected syntax error");
    };
    assert_eq!(syntax.fragment, "<end of input>");
    let rendered = syntax.render("condition");
    assert!(rendered.contains("Expected a value"), "Got: {}", rendered);
}

#[test]
fn test_invalid_regex_display() {
    let err = parse_condition("name = /(unclosed/").unwrap_err();
    assert!(
        matches!(err, Error::InvalidRegex { ref pattern, .. } if pattern == "(unclosed"),
        "Got: {:?}",
        err
    );
}

#[test]
fn test_expression_display_is_stable() {
    let expr = parse_expression(r#"\FIRSTUC{parent -> name} + "-" + \MGP{1}"#).unwrap();
    insta::assert_snapshot!(expr.to_string(), @r"\FIRSTUC{parent -> name} + {-} + \MGP{1}");
}
