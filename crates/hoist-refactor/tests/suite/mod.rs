use hoist_refactor::{ExtractVariable, FileId, Selection, Tweak};
use hoist_syntax::{parse_with_options, Dialect, ParseOptions};
use hoist_test_utils::extract_range;
use pretty_assertions::assert_eq;

mod availability;
mod binary_operators;
mod chain_props;
mod insertion;
mod lambdas;
mod macros;
mod types;

/// Runs `tweak` on the marked selection of `fixture`. Returns the rewritten text, or `None`
/// when the tweak is not available.
pub(crate) fn run(mut tweak: ExtractVariable, dialect: Dialect, fixture: &str) -> Option<String> {
    let (text, range) = extract_range(fixture);
    let tree = parse_with_options(&text, ParseOptions::new(dialect))
        .unwrap_or_else(|err| panic!("fixture does not parse: {err}\n{text}"));
    let selection = Selection::new(FileId::new("main.cpp"), &tree, range);
    if !tweak.prepare(&selection) {
        return None;
    }
    let effect = tweak.apply(&selection).expect("prepared tweak applies");
    assert_eq!(effect.edit.edits.len(), 2, "{:?}", effect.edit);
    Some(effect.apply(&text).expect("edits apply"))
}

#[track_caller]
pub(crate) fn check_in(dialect: Dialect, fixture: &str, expected: &str) {
    assert_eq!(
        run(ExtractVariable::default(), dialect, fixture).as_deref(),
        Some(expected)
    );
}

#[track_caller]
pub(crate) fn check(fixture: &str, expected: &str) {
    check_in(Dialect::Cxx, fixture, expected);
}

#[track_caller]
pub(crate) fn check_unavailable_in(dialect: Dialect, fixture: &str) {
    assert_eq!(run(ExtractVariable::default(), dialect, fixture), None);
}

#[track_caller]
pub(crate) fn check_unavailable(fixture: &str) {
    check_unavailable_in(Dialect::Cxx, fixture);
}
