//! Which selected expressions may be hoisted into a variable.

use std::fmt;

use hoist_syntax::{BinaryOp, Coverage, NodeId, NodeKind, SelectionTree, SyntaxTree};

use crate::binary_range::ParsedBinaryOperator;

/// Why an expression cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ineligible {
    NotAnExpression,
    VoidType,
    /// A bare name: extracting it would only introduce an alias.
    DeclReference,
    /// A field accessed through the implicit `this` of a method.
    ImplicitMemberAccess,
    Assignment,
    NoParent,
    /// Conditions of `case` labels and unbraced bodies of loops and `if` statements.
    DisallowedStatement,
    /// The whole right-hand side of an assignment.
    AssignmentOperand,
    PartialLambda,
    /// The whole initializer of a variable.
    Initializer,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Ineligible::NotAnExpression => "selection is not an expression",
            Ineligible::VoidType => "expression has no value",
            Ineligible::DeclReference => "expression is a plain reference",
            Ineligible::ImplicitMemberAccess => "expression is an implicit member access",
            Ineligible::Assignment => "expression is an assignment",
            Ineligible::NoParent => "expression has no parent",
            Ineligible::DisallowedStatement => "expression is in an unbraced statement position",
            Ineligible::AssignmentOperand => "expression is the whole right-hand side of an assignment",
            Ineligible::PartialLambda => "lambda is only partially selected",
            Ineligible::Initializer => "expression is the whole initializer of a variable",
        };
        f.write_str(message)
    }
}

/// The expression that an extraction starting at `node` would hoist.
///
/// A selected callee (`foo` in `foo(x)`) stands for the whole call.
pub fn extraction_target(selection: &SelectionTree<'_>, node: NodeId) -> Result<NodeId, Ineligible> {
    let tree = selection.tree();
    let kind = tree.kind(node);
    if !kind.is_expr() {
        return Err(Ineligible::NotAnExpression);
    }

    let mut target = node;
    if matches!(kind, NodeKind::DeclRef { .. } | NodeKind::Member { .. }) {
        if let Some(call) = enclosing_call(tree, node) {
            target = call;
        }
    }

    if matches!(tree.kind(target), NodeKind::Binary { op: BinaryOp::Assign }) {
        return Err(Ineligible::Assignment);
    }
    check_eligibility(selection, target)?;
    Ok(target)
}

/// Checks whether `node` may be extracted as it stands.
pub fn check_eligibility(selection: &SelectionTree<'_>, node: NodeId) -> Result<(), Ineligible> {
    let tree = selection.tree();
    let kind = tree.kind(node);
    if !kind.is_expr() {
        return Err(Ineligible::NotAnExpression);
    }
    if tree.ty(node).map_or(true, |ty| ty.is_void()) {
        return Err(Ineligible::VoidType);
    }

    match kind {
        NodeKind::DeclRef { .. } => return Err(Ineligible::DeclReference),
        NodeKind::Member { .. } => {
            let base = tree.member_base(node).map(|base| tree.ignore_implicit(base));
            if let Some(base) = base {
                if tree.kind(base) == &(NodeKind::This { implicit: true }) {
                    return Err(Ineligible::ImplicitMemberAccess);
                }
            }
        }
        _ => {}
    }

    let binary = ParsedBinaryOperator::parse(selection, node);
    if binary.as_ref().is_some_and(|binary| binary.op.is_assignment()) {
        return Err(Ineligible::Assignment);
    }

    let outer = tree.outer_implicit(node);
    let Some(parent) = tree.parent(outer) else {
        return Err(Ineligible::NoParent);
    };
    if child_is_disallowed_statement(tree, parent, outer) {
        return Err(Ineligible::DisallowedStatement);
    }

    // Binary operators only count when nothing of the chain is left outside the selection.
    let is_fully_selected_target = |candidate: Option<NodeId>| {
        candidate == Some(outer) && (binary.is_none() || selection.is_fully_selected(node))
    };

    if let NodeKind::Binary { op } = tree.kind(parent) {
        let rhs = tree.binary_operands(parent).map(|(_, rhs)| rhs);
        if op.is_assignment() && is_fully_selected_target(rhs) {
            return Err(Ineligible::AssignmentOperand);
        }
    }

    if matches!(kind, NodeKind::Lambda { .. }) {
        return if selection.coverage(node) == Coverage::Complete {
            Ok(())
        } else {
            Err(Ineligible::PartialLambda)
        };
    }

    let parent_kind = tree.kind(parent);
    let is_init_capture = matches!(
        parent_kind,
        NodeKind::VarDecl {
            init_capture: true,
            ..
        }
    );
    if parent_kind.is_var_decl() && !is_init_capture && is_fully_selected_target(tree.var_init(parent)) {
        return Err(Ineligible::Initializer);
    }

    Ok(())
}

/// The call whose callee is `node`, looking through implicit conversions.
fn enclosing_call(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let callee = tree.outer_implicit(node);
    let call = tree.parent(callee)?;
    (tree.call_callee(call) == Some(callee)).then_some(call)
}

/// Positions where an expression is a statement of its own, but a declaration cannot be
/// inserted in front of it.
fn child_is_disallowed_statement(tree: &SyntaxTree, outer: NodeId, inner: NodeId) -> bool {
    match tree.kind(outer) {
        NodeKind::Case | NodeKind::Default => true,
        NodeKind::While | NodeKind::Do | NodeKind::For | NodeKind::ForRange => {
            tree.loop_body(outer) == Some(inner)
        }
        NodeKind::If => tree.if_then(outer) == Some(inner) || tree.if_else(outer) == Some(inner),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_syntax::{parse, TextRange, TextSize};

    fn target(text: &str, needle: &str) -> Result<String, Ineligible> {
        let tree = parse(text).unwrap();
        let start = text.rfind(needle).unwrap() as u32;
        let range = TextRange::at(TextSize::from(start), TextSize::from(needle.len() as u32));
        let selection = SelectionTree::new(&tree, range);
        let node = selection.common_ancestor().unwrap();
        extraction_target(&selection, node).map(|id| tree.node_text(id).to_string())
    }

    #[test]
    fn callees_stand_for_the_call() {
        let text = "int foo(int v); int f(int x) { return foo(x) + 1; }";
        assert_eq!(target(text, "foo").as_deref(), Ok("foo(x)"));
    }

    #[test]
    fn rejects_plain_references_and_void_calls() {
        assert_eq!(
            target("int f(int x) { return x + 1; }", "x"),
            Err(Ineligible::DeclReference)
        );
        assert_eq!(
            target("void g(); void f() { g(); }", "g()"),
            Err(Ineligible::VoidType)
        );
    }

    #[test]
    fn rejects_whole_initializers_but_not_parts() {
        let text = "void f() { int x = 1 + 2 + 3; }";
        assert_eq!(target(text, "1 + 2 + 3"), Err(Ineligible::Initializer));
        assert_eq!(target(text, "2 + 3").as_deref(), Ok("1 + 2 + 3"));
    }

    #[test]
    fn rejects_assignments_and_their_right_hand_side() {
        let text = "void f() { int x; x = 1 + 2; }";
        assert_eq!(target(text, "x = 1 + 2"), Err(Ineligible::Assignment));
        assert_eq!(target(text, "1 + 2"), Err(Ineligible::AssignmentOperand));
    }

    #[test]
    fn rejects_unbraced_loop_bodies() {
        let text = "int g(int v); void f(int x) { while (x) g(x); }";
        assert_eq!(target(text, "g(x)"), Err(Ineligible::DisallowedStatement));
    }

    #[test]
    fn ineligibility_reads_as_a_sentence() {
        assert_eq!(
            Ineligible::PartialLambda.to_string(),
            "lambda is only partially selected"
        );
    }
}
