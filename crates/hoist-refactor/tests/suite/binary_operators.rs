use super::check;

#[test]
fn extracts_the_selected_suffix_of_a_chain() {
    check(
        "int f(int a, int b, int c) { return a + /*start*/b + c/*end*/; }",
        "int f(int a, int b, int c) { auto placeholder = b + c; return a + placeholder; }",
    );
}

#[test]
fn extracts_a_prefix_that_is_its_own_node() {
    check(
        "void f() { int x = /*start*/5 + 4/*end*/ + 3; }",
        "void f() { auto placeholder = 5 + 4; int x = placeholder + 3; }",
    );
}

#[test]
fn extracts_the_middle_of_a_chain() {
    check(
        "int f(int a, int b, int c, int d) { return a * /*start*/b * c/*end*/ * d; }",
        "int f(int a, int b, int c, int d) { auto placeholder = b * c; return a * placeholder * d; }",
    );
}

#[test]
fn precedence_widens_the_selection_to_the_whole_operand() {
    // `4 * 3` binds tighter, so `5 + 4` is not a node of its own.
    check(
        "void f() { int x = /*start*/5 + 4/*end*/ * 3; }",
        "void f() { auto placeholder = 5 + 4 * 3; int x = placeholder; }",
    );
}

#[test]
fn non_associative_operators_extract_the_whole_node() {
    check(
        "int f(int a, int b, int c) { return a - /*start*/b - c/*end*/; }",
        "int f(int a, int b, int c) { auto placeholder = a - b - c; return placeholder; }",
    );
}

#[test]
fn a_different_inner_operator_ends_the_descent() {
    check(
        "int f(int a, int b, int c) { return a * /*start*/b + c/*end*/; }",
        "int f(int a, int b, int c) { auto placeholder = a * b + c; return placeholder; }",
    );
}

#[test]
fn logical_chains_are_associative() {
    check(
        "bool f(bool a, bool b, bool c) { return a && /*start*/b && c/*end*/; }",
        "bool f(bool a, bool b, bool c) { auto placeholder = b && c; return a && placeholder; }",
    );
}

#[test]
fn partially_selected_operands_are_extracted_whole() {
    check(
        "int f(int a, int b, int c) { return a + b * /*start*/c + a/*end*/; }",
        "int f(int a, int b, int c) { auto placeholder = b * c + a; return a + placeholder; }",
    );
}

#[test]
fn part_of_an_expression_statement_is_replaced_by_the_variable() {
    check(
        "int g(int v); void f(int a, int b, int c) { g(a) + /*start*/b + c/*end*/; }",
        "int g(int v); void f(int a, int b, int c) { auto placeholder = b + c; g(a) + placeholder; }",
    );
}
