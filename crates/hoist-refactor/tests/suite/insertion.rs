use super::{check, check_unavailable};

#[test]
fn inserts_after_the_declarations_it_depends_on() {
    check(
        "int f(); int g(int v); void h() { int y = f(); g(/*start*/y + 1/*end*/); }",
        "int f(); int g(int v); void h() { int y = f(); auto placeholder = y + 1; g(placeholder); }",
    );
}

#[test]
fn loop_variables_cannot_escape_the_loop_header() {
    check_unavailable("void h(int n) { for (int i = 0; i < /*start*/n + i/*end*/; i += 1) { } }");
}

#[test]
fn loop_initializers_hoist_above_the_loop() {
    check(
        "void h(int n) { for (int i = /*start*/n * 2/*end*/ + 1; i < n; i += 1) { } }",
        "void h(int n) { auto placeholder = n * 2; for (int i = placeholder + 1; i < n; i += 1) { } }",
    );
}

#[test]
fn braced_loop_bodies_keep_the_declaration_inside() {
    check(
        "int g(int v); void h(int a) { while (a) { g(/*start*/a * 2/*end*/); } }",
        "int g(int v); void h(int a) { while (a) { auto placeholder = a * 2; g(placeholder); } }",
    );
}

#[test]
fn unbraced_branches_hoist_above_the_if() {
    check(
        "int g(int v); int h(int a) { if (a) return g(/*start*/a * 2/*end*/); return 0; }",
        "int g(int v); int h(int a) { auto placeholder = a * 2; if (a) return g(placeholder); return 0; }",
    );
}

#[test]
fn earlier_declarators_of_the_same_statement_block_extraction() {
    check_unavailable("void h() { int a = 1, b = /*start*/a + 1/*end*/ + 2; }");
}

#[test]
fn default_arguments_are_unavailable() {
    check_unavailable("void h(int a = /*start*/1 + 2/*end*/ + 3) { }");
}

#[test]
fn global_initializers_are_unavailable() {
    check_unavailable("int x = /*start*/1 + 2/*end*/ + 3;");
}

#[test]
fn compound_statements_from_macros_are_skipped() {
    check(
        "#define OPEN {\nint g(int v); void h(int a) { OPEN g(/*start*/a * 2/*end*/); } }",
        "#define OPEN {\nint g(int v); void h(int a) { auto placeholder = a * 2; OPEN g(placeholder); } }",
    );
}

#[test]
fn attributed_statements_hoist_above_the_attributes() {
    check(
        "int h(int a) { [[likely]] return /*start*/a * 2/*end*/ + 1; }",
        "int h(int a) { auto placeholder = a * 2; [[likely]] return placeholder + 1; }",
    );
}
