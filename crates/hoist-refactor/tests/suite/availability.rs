use hoist_config::ExtractVariableConfig;
use hoist_refactor::{ExtractVariable, FileId, Selection, Tweak, TweakError};
use hoist_syntax::{parse, Dialect};
use hoist_test_utils::extract_range;
use pretty_assertions::assert_eq;

use super::{check, check_unavailable, run};

#[test]
fn extracts_an_operand_of_a_return() {
    check(
        "int f() { return /*start*/1 + 2/*end*/; }",
        "int f() { auto placeholder = 1 + 2; return placeholder; }",
    );
}

#[test]
fn surrounding_whitespace_is_ignored() {
    check(
        "int f(int a) { return a */*start*/ (a + 1)/*end*/; }",
        "int f(int a) { auto placeholder = (a + 1); return a * placeholder; }",
    );
}

#[test]
fn empty_and_blank_selections_are_unavailable() {
    check_unavailable("int f() { return /*start*//*end*/1 + 2; }");
    check_unavailable("int f() { return 1 +/*start*/ /*end*/2; }");
}

#[test]
fn plain_references_are_unavailable() {
    check_unavailable("int f(int a) { return /*start*/a/*end*/; }");
}

#[test]
fn void_expressions_are_unavailable() {
    check_unavailable("void g(); void f() { /*start*/g()/*end*/; }");
}

#[test]
fn expression_statements_become_declarations() {
    check(
        "int g(int v); void f(int a) { /*start*/g(a + 1)/*end*/; }",
        "int g(int v); void f(int a) { auto placeholder = g(a + 1); }",
    );
}

#[test]
fn selected_callees_extract_the_call() {
    check(
        "int foo(int v); int f(int x) { return /*start*/foo/*end*/(x) + 1; }",
        "int foo(int v); int f(int x) { auto placeholder = foo(x); return placeholder + 1; }",
    );
}

#[test]
fn assignments_are_unavailable() {
    check_unavailable("void f() { int x; /*start*/x = 1/*end*/; }");
    check_unavailable("void f() { int x; x = /*start*/1 + 2/*end*/; }");
}

#[test]
fn parts_of_an_assigned_value_are_available() {
    check(
        "void f() { int x; x = /*start*/1 + 2/*end*/ + 3; }",
        "void f() { int x; auto placeholder = 1 + 2; x = placeholder + 3; }",
    );
}

#[test]
fn whole_initializers_are_unavailable() {
    check_unavailable("void f() { int x = /*start*/1 + 2/*end*/; }");
}

#[test]
fn statement_positions_without_braces_are_unavailable() {
    check_unavailable("int g(int v); void f(int a) { while (a) /*start*/g(a)/*end*/; }");
    check_unavailable("int g(int v); void f(int a) { if (a) /*start*/g(a)/*end*/; }");
    check_unavailable(
        "void f(int a) { switch (a) { case /*start*/1 + 1/*end*/: break; } }",
    );
}

#[test]
fn labelled_statements_are_unavailable() {
    check_unavailable("int g(int v); void f(int a) { done: g(/*start*/a * 2/*end*/); }");
}

#[test]
fn implicit_member_accesses_are_unavailable() {
    check_unavailable("struct S { int v; int get() { return /*start*/v/*end*/ + 1; } };");
    check(
        "struct S { int v; int get() { return /*start*/this->v/*end*/ + 1; } };",
        "struct S { int v; int get() { auto placeholder = this->v; return placeholder + 1; } };",
    );
}

#[test]
fn disabled_configuration_declines() {
    let config = ExtractVariableConfig {
        enabled: false,
        ..ExtractVariableConfig::default()
    };
    let fixture = "int f() { return /*start*/1 + 2/*end*/; }";
    assert_eq!(run(ExtractVariable::new(config), Dialect::Cxx, fixture), None);
}

#[test]
fn configured_name_is_used() {
    let config = ExtractVariableConfig {
        variable_name: "sum".to_string(),
        ..ExtractVariableConfig::default()
    };
    let fixture = "int f() { return /*start*/1 + 2/*end*/; }";
    assert_eq!(
        run(ExtractVariable::new(config), Dialect::Cxx, fixture).as_deref(),
        Some("int f() { auto sum = 1 + 2; return sum; }")
    );
}

#[test]
fn apply_is_single_use() {
    let (text, range) = extract_range("int f() { return /*start*/1 + 2/*end*/; }");
    let tree = parse(&text).unwrap();
    let selection = Selection::new(FileId::new("main.cpp"), &tree, range);

    let mut tweak = ExtractVariable::default();
    assert_eq!(tweak.apply(&selection), Err(TweakError::NotPrepared));
    assert!(tweak.prepare(&selection));
    assert!(tweak.apply(&selection).is_ok());
    assert_eq!(tweak.apply(&selection), Err(TweakError::NotPrepared));
}
