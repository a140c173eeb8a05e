//! Extraction of operand subsequences from associative operator chains.
//!
//! `a + b + c` parses as `(a + b) + c`, so selecting `b + c` has the outer `+` as its common
//! ancestor with only part of its left operand selected. Because the operator is associative
//! the selected operands may still be extracted on their own.

use hoist_syntax::{BinaryOp, ExpansionId, NodeId, NodeKind, SelectionTree, SyntaxTree, TextRange};

/// A binary operator node together with its operands that the selection touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBinaryOperator {
    pub op: BinaryOp,
    pub expansion: Option<ExpansionId>,
    pub selected_operands: Vec<NodeId>,
}

impl ParsedBinaryOperator {
    /// Returns `None` when `node` is not a binary operator.
    pub fn parse(selection: &SelectionTree<'_>, node: NodeId) -> Option<Self> {
        let tree = selection.tree();
        let NodeKind::Binary { op } = tree.kind(node) else {
            return None;
        };
        Some(Self {
            op: *op,
            expansion: tree.expansion(node),
            selected_operands: selection.children(node),
        })
    }

    /// Whether any selected operand comes from a different macro expansion than the
    /// operator itself.
    pub fn crosses_macro_boundary(&self, tree: &SyntaxTree) -> bool {
        self.selected_operands
            .iter()
            .any(|&operand| tree.expansion(operand) != self.expansion)
    }
}

/// The range spanning the selected operands of an associative chain rooted at `node`.
///
/// Returns `None` unless `node` is an associative operator whose two operands are both
/// (at least partially) selected and none of them crosses a macro boundary. Chains of the
/// same operator are then descended on the left until the first selected operand is found.
pub fn binary_operator_range(selection: &SelectionTree<'_>, node: NodeId) -> Option<TextRange> {
    let tree = selection.tree();
    let outer = ParsedBinaryOperator::parse(selection, tree.ignore_implicit(node))?;
    if !outer.op.is_associative() || outer.crosses_macro_boundary(tree) {
        return None;
    }
    let [mut start, end] = outer.selected_operands[..] else {
        return None;
    };

    while let Some(inner) = ParsedBinaryOperator::parse(selection, tree.ignore_implicit(start)) {
        if inner.op != outer.op || inner.crosses_macro_boundary(tree) {
            break;
        }
        match inner.selected_operands[..] {
            [only] => {
                start = only;
                break;
            }
            [first, ..] => start = first,
            [] => break,
        }
    }

    Some(TextRange::new(tree.range(start).start(), tree.range(end).end()))
}
