use std::collections::HashMap;

use hoist_refactor::ExtractVariable;
use hoist_syntax::Dialect;
use proptest::prelude::*;

use super::run;

const PROPTEST_CASES: u32 = 256;

const ASSOCIATIVE: &[&str] = &["+", "*", "&", "|", "^", "&&", "||"];

const ALL: &[&str] = &["+", "*", "&", "|", "^", "&&", "||", "-", "/", "<<"];

const MAX_OPERANDS: usize = 8;

/// An operator, the number of operands and a selected operand span `first..=last`.
fn arb_chain(ops: &'static [&'static str]) -> impl Strategy<Value = (&'static str, usize, usize, usize)> {
    (prop::sample::select(ops), 3usize..MAX_OPERANDS)
        .prop_flat_map(|(op, len)| (Just(op), Just(len), 0..len - 1))
        .prop_flat_map(|(op, len, first)| (Just(op), Just(len), Just(first), first + 1..len))
}

fn operands(len: usize) -> Vec<String> {
    (0..len).map(|i| format!("a{i}")).collect()
}

fn function(operands: &[String], body: &str) -> String {
    let params: Vec<String> = operands.iter().map(|name| format!("int {name}")).collect();
    format!("int f({}) {{ {body} }}", params.join(", "))
}

fn join(parts: &[String], op: &str) -> String {
    parts.join(&format!(" {op} "))
}

/// `parts[..first] op <marked> op parts[last + 1..]`, with `marked` standing for the span.
fn splice(parts: &[String], op: &str, first: usize, last: usize, marked: &str) -> String {
    let mut out: Vec<String> = parts[..first].to_vec();
    out.push(marked.to_string());
    out.extend_from_slice(&parts[last + 1..]);
    join(&out, op)
}

fn extract(fixture: &str) -> Option<String> {
    run(ExtractVariable::default(), Dialect::Cxx, fixture)
}

/// Integer semantics for `op`, total over all inputs.
fn apply_op(op: &str, lhs: i64, rhs: i64) -> i64 {
    match op {
        "+" => lhs.wrapping_add(rhs),
        "-" => lhs.wrapping_sub(rhs),
        "*" => lhs.wrapping_mul(rhs),
        "/" => lhs.checked_div(rhs).unwrap_or(0),
        "<<" => lhs.wrapping_shl((rhs & 7) as u32),
        "&" => lhs & rhs,
        "|" => lhs | rhs,
        "^" => lhs ^ rhs,
        "&&" => i64::from(lhs != 0 && rhs != 0),
        "||" => i64::from(lhs != 0 || rhs != 0),
        other => panic!("unexpected operator `{other}`"),
    }
}

/// Evaluates a flat left-to-right chain of `op` over names bound in `env`.
fn eval(chain: &str, op: &str, env: &HashMap<String, i64>) -> i64 {
    let sep = format!(" {op} ");
    let mut values = chain
        .split(&sep)
        .map(|name| env[name.trim()]);
    let first = values.next().expect("chain has an operand");
    values.fold(first, |acc, value| apply_op(op, acc, value))
}

/// Splits a rewritten `{ auto placeholder = <init>; return <chain>; }` body.
fn rewritten_parts(text: &str) -> (&str, &str) {
    let (_, rest) = text
        .split_once("auto placeholder = ")
        .expect("declaration inserted");
    let (init, rest) = rest.split_once("; return ").expect("return kept");
    let (ret, _) = rest.split_once(';').expect("return terminated");
    (init, ret)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn associative_chains_extract_exactly_the_selected_operands(
        (op, len, first, last) in arb_chain(ASSOCIATIVE)
    ) {
        let names = operands(len);
        let selected = join(&names[first..=last], op);
        let marked = format!("/*start*/{selected}/*end*/");
        let fixture = function(&names, &format!("return {};", splice(&names, op, first, last, &marked)));

        let expected = function(
            &names,
            &format!(
                "auto placeholder = {selected}; return {};",
                splice(&names, op, first, last, "placeholder")
            ),
        );
        prop_assert_eq!(extract(&fixture), Some(expected));
    }

    #[test]
    fn non_associative_chains_extract_the_enclosing_prefix(
        (op, len, first, last) in arb_chain(&["-", "/", "<<"])
    ) {
        let names = operands(len);
        let selected = join(&names[first..=last], op);
        let marked = format!("/*start*/{selected}/*end*/");
        let fixture = function(&names, &format!("return {};", splice(&names, op, first, last, &marked)));

        let prefix = join(&names[..=last], op);
        let expected = function(
            &names,
            &format!(
                "auto placeholder = {prefix}; return {};",
                splice(&names, op, 0, last, "placeholder")
            ),
        );
        prop_assert_eq!(extract(&fixture), Some(expected));
    }

    #[test]
    fn rewritten_chains_evaluate_to_the_original_value(
        (op, len, first, last) in arb_chain(ALL),
        values in prop::collection::vec(-20i64..20, MAX_OPERANDS),
    ) {
        let names = operands(len);
        let marked = format!("/*start*/{}/*end*/", join(&names[first..=last], op));
        let original = splice(&names, op, first, last, &marked);
        let fixture = function(&names, &format!("return {original};"));
        let rewritten = extract(&fixture).expect("extraction is available");

        let mut env: HashMap<String, i64> = names.iter().cloned().zip(values).collect();
        let expected = eval(&join(&names, op), op, &env);

        let (init, ret) = rewritten_parts(&rewritten);
        let placeholder = eval(init, op, &env);
        env.insert("placeholder".to_string(), placeholder);
        prop_assert_eq!(eval(ret, op, &env), expected, "{}", rewritten);
    }
}
