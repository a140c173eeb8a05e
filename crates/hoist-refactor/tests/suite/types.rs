use hoist_syntax::Dialect;

use super::{check_in, check_unavailable_in};

#[test]
fn c_spells_out_the_type() {
    check_in(
        Dialect::C,
        "int f(int a) { return /*start*/a * 2/*end*/ + 1; }",
        "int f(int a) { int placeholder = a * 2; return placeholder + 1; }",
    );
}

#[test]
fn c_records_keep_the_struct_keyword() {
    check_in(
        Dialect::C,
        "struct P { int x; };\nstruct P g(void);\nint f(void) { return /*start*/g()/*end*/.x; }",
        "struct P { int x; };\nstruct P g(void);\nint f(void) { struct P placeholder = g(); return placeholder.x; }",
    );
}

#[test]
fn floating_arithmetic_is_promoted() {
    check_in(
        Dialect::C,
        "double f(double d, int i) { return /*start*/d * i/*end*/ - 1; }",
        "double f(double d, int i) { double placeholder = d * i; return placeholder - 1; }",
    );
}

#[test]
fn outer_nullability_is_dropped() {
    check_in(
        Dialect::ObjC,
        "int * _Nullable get(void);\nint f(void) { return */*start*/get()/*end*/; }",
        "int * _Nullable get(void);\nint f(void) { int *placeholder = get(); return *placeholder; }",
    );
}

#[test]
fn property_reads_use_the_property_type() {
    check_in(
        Dialect::ObjC,
        "struct Box { @property int count; };\nint f(struct Box *b) { return /*start*/b->count/*end*/ + 1; }",
        "struct Box { @property int count; };\nint f(struct Box *b) { int placeholder = b->count; return placeholder + 1; }",
    );
}

#[test]
fn property_writes_are_unavailable() {
    check_unavailable_in(
        Dialect::ObjC,
        "struct Box { @property int count; };\nvoid f(struct Box *b) { /*start*/b->count/*end*/ = 1; }",
    );
    check_unavailable_in(
        Dialect::ObjC,
        "struct Box { @property int count; };\nvoid f(struct Box *b) { /*start*/b->count/*end*/ += 1; }",
    );
}
