use super::check;

#[test]
fn a_whole_macro_expansion_is_replaced_by_its_name() {
    check(
        "#define EXPR (1 + 2)\nint f() { return /*start*/EXPR/*end*/ * 3; }",
        "#define EXPR (1 + 2)\nint f() { auto placeholder = EXPR; return placeholder * 3; }",
    );
}

#[test]
fn chains_crossing_into_a_macro_extract_the_whole_chain() {
    check(
        "#define TWO 2\nint f(int a) { return a + /*start*/TWO + 3/*end*/; }",
        "#define TWO 2\nint f(int a) { auto placeholder = a + TWO + 3; return placeholder; }",
    );
}

#[test]
fn operators_from_a_macro_are_not_regrouped() {
    check(
        "#define SUM 1 + 1\nint f() { return /*start*/SUM + 2/*end*/; }",
        "#define SUM 1 + 1\nint f() { auto placeholder = SUM + 2; return placeholder; }",
    );
}
