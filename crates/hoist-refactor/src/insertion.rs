//! Where the new variable declaration goes.

use hoist_syntax::{DeclId, NodeId, NodeKind, SyntaxTree};

/// The statement in front of which the declaration for `expr` is inserted.
///
/// Walks up from `expr` for as long as a declaration may legally be placed outside the
/// current node, and stops at the first statement whose parent is a written (not macro
/// expanded) compound statement. Returns `None` if some statement on the way declares an
/// entity that `expr` references, or if no such compound statement is reached.
pub fn insertion_point(tree: &SyntaxTree, expr: NodeId, referenced: &[DeclId]) -> Option<NodeId> {
    let mut current = expr;
    while let Some(parent) = tree.parent(current) {
        if !can_extract_outside(tree, current) {
            tracing::trace!(
                target = "hoist.refactor",
                node = ?tree.kind(current),
                "cannot hoist past node"
            );
            break;
        }
        let is_stmt = tree.kind(current).is_stmt();
        if is_stmt && !expr_is_valid_outside(tree, current, referenced) {
            tracing::trace!(
                target = "hoist.refactor",
                scope = ?tree.range(current),
                "referenced declaration would escape its scope"
            );
            break;
        }
        if tree.kind(parent) == &NodeKind::Compound {
            if tree.expansion(parent).is_none() {
                return is_stmt.then_some(current);
            }
            tracing::trace!(
                target = "hoist.refactor",
                "skipping compound statement expanded from a macro"
            );
        }
        current = parent;
    }
    None
}

/// Whether none of `referenced` is declared within `scope`.
pub fn expr_is_valid_outside(tree: &SyntaxTree, scope: NodeId, referenced: &[DeclId]) -> bool {
    let scope = tree.range(scope);
    referenced
        .iter()
        .all(|&decl| !scope.contains_range(tree.decl(decl).range))
}

/// Whether a declaration may be inserted in front of the statement that contains `node`.
fn can_extract_outside(tree: &SyntaxTree, node: NodeId) -> bool {
    let kind = tree.kind(node);
    if kind.is_expr() {
        // Default arguments are evaluated at the call site.
        let parent = tree.parent(node).map(|parent| tree.kind(parent));
        return !matches!(parent, Some(NodeKind::ParmVarDecl { .. }));
    }
    if kind.is_stmt() {
        return matches!(
            kind,
            NodeKind::Attributed
                | NodeKind::Compound
                | NodeKind::ForRange
                | NodeKind::DeclStmt
                | NodeKind::Do
                | NodeKind::For
                | NodeKind::If
                | NodeKind::Return
                | NodeKind::While
        );
    }
    kind.is_var_decl()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::referenced_decls;
    use hoist_syntax::parse;

    fn insertion_text(text: &str, expr: &str) -> Option<String> {
        let tree = parse(text).unwrap();
        let id = tree
            .node_ids()
            .find(|&id| tree.kind(id).is_expr() && tree.node_text(id) == expr)
            .unwrap();
        let referenced = referenced_decls(&tree, id);
        insertion_point(&tree, id, &referenced).map(|point| tree.node_text(point).to_string())
    }

    #[test]
    fn inserts_before_the_enclosing_statement() {
        let text = "int f(int); void g() { int y = f(1); f(y + 1); }";
        assert_eq!(insertion_text(text, "y + 1").as_deref(), Some("f(y + 1)"));
    }

    #[test]
    fn stops_when_a_referenced_declaration_would_escape() {
        let text = "void g(int n) { for (int i = 0; i < n + i; i += 1) { } }";
        assert_eq!(insertion_text(text, "n + i"), None);
    }

    #[test]
    fn default_arguments_have_no_insertion_point() {
        let text = "void g(int a = 1 + 2) { }";
        assert_eq!(insertion_text(text, "1 + 2"), None);
    }

    #[test]
    fn global_initializers_have_no_insertion_point() {
        assert_eq!(insertion_text("int x = 1 + 2;", "1 + 2"), None);
    }

    #[test]
    fn unbraced_if_branches_hoist_above_the_if() {
        let text = "int f(int); void g(int a) { if (a) return f(a * 2); }";
        assert_eq!(
            insertion_text(text, "a * 2").as_deref(),
            Some("if (a) return f(a * 2);")
        );
    }
}
