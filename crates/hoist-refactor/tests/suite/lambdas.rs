use super::{check, check_unavailable};

#[test]
fn fully_selected_lambdas_are_extracted() {
    check(
        "int run(int f); int h() { return run(/*start*/[] { return 1; }/*end*/); }",
        "int run(int f); int h() { auto placeholder = [] { return 1; }; return run(placeholder); }",
    );
}

#[test]
fn partially_selected_lambdas_are_unavailable() {
    check_unavailable("int run(int f); int h() { return run(/*start*/[] { return 1/*end*/; }); }");
}

#[test]
fn lambdas_capturing_locals_are_extracted_after_them() {
    check(
        "int run(int f); void h() { int a = 1; run(/*start*/[&] { return a + 1; }/*end*/); }",
        "int run(int f); void h() { int a = 1; auto placeholder = [&] { return a + 1; }; run(placeholder); }",
    );
}

#[test]
fn immediately_invoked_lambdas_are_extracted_with_the_call() {
    check(
        "int h() { return /*start*/[] { return 1; }()/*end*/ + 1; }",
        "int h() { auto placeholder = [] { return 1; }(); return placeholder + 1; }",
    );
}

#[test]
fn expressions_in_lambda_bodies_stay_in_the_body() {
    check(
        "void h() { auto l = [](int p) { return /*start*/p * 2/*end*/ + 1; }; }",
        "void h() { auto l = [](int p) { auto placeholder = p * 2; return placeholder + 1; }; }",
    );
}

#[test]
fn init_captures_hoist_out_of_the_lambda() {
    check(
        "void h() { int c = 1; auto l = [d = /*start*/c + 1/*end*/] { return d; }; }",
        "void h() { int c = 1; auto placeholder = c + 1; auto l = [d = placeholder] { return d; }; }",
    );
}

#[test]
fn lambda_default_arguments_are_unavailable() {
    check_unavailable("void h() { auto l = [](int p = /*start*/1 + 2/*end*/ + 3) { return p; }; }");
}
