//! Selection coverage over a [`SyntaxTree`].

use text_size::TextSize;

use crate::tree::{NodeId, SyntaxTree};
use crate::TextRange;

/// How much of a node's source range is covered by the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    None,
    Partial,
    Complete,
}

/// A pruned view of a syntax tree: only nodes touched by the selection are visible as
/// children.
#[derive(Debug, Clone)]
pub struct SelectionTree<'a> {
    tree: &'a SyntaxTree,
    range: TextRange,
    coverage: Vec<Coverage>,
}

impl<'a> SelectionTree<'a> {
    /// Builds the selection for `range`, trimmed of surrounding whitespace.
    pub fn new(tree: &'a SyntaxTree, range: TextRange) -> Self {
        let range = trim(tree.text(), range);
        let mut coverage = vec![Coverage::None; tree.len()];

        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let node_range = tree.range(id);
            let parent_covered = tree
                .parent(id)
                .map_or(true, |parent| coverage[parent.idx()] != Coverage::None);
            coverage[id.idx()] = if !parent_covered || range.is_empty() {
                Coverage::None
            } else if node_range.is_empty() {
                if range.contains_inclusive(node_range.start()) {
                    Coverage::Complete
                } else {
                    Coverage::None
                }
            } else if range.contains_range(node_range) {
                Coverage::Complete
            } else if range.intersect(node_range).is_some_and(|common| !common.is_empty()) {
                Coverage::Partial
            } else {
                Coverage::None
            };
            stack.extend(tree.children(id).iter().copied());
        }

        Self {
            tree,
            range,
            coverage,
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// The trimmed selection range.
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn coverage(&self, id: NodeId) -> Coverage {
        self.coverage[id.idx()]
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.coverage(id) != Coverage::None
    }

    /// Children of `id` that the selection touches, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_selected(child))
            .collect()
    }

    /// The deepest node whose range contains the whole selection.
    ///
    /// Returns `None` for empty selections.
    pub fn common_ancestor(&self) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }
        let mut current = self.tree.root();
        if !self.tree.range(current).contains_range(self.range) {
            return None;
        }
        loop {
            let mut containing = self
                .tree
                .children(current)
                .iter()
                .copied()
                .filter(|&child| self.tree.range(child).contains_range(self.range));
            match (containing.next(), containing.next()) {
                (Some(child), None) => current = child,
                _ => return Some(current),
            }
        }
    }

    /// Whether `id` and every selected descendant are completely covered. Zero-width nodes
    /// do not count against this.
    pub fn is_fully_selected(&self, id: NodeId) -> bool {
        if !self.tree.range(id).is_empty() && self.coverage(id) != Coverage::Complete {
            return false;
        }
        self.children(id)
            .into_iter()
            .all(|child| self.is_fully_selected(child))
    }
}

fn trim(text: &str, range: TextRange) -> TextRange {
    let len = TextSize::from(text.len() as u32);
    let start = range.start().min(len);
    let end = range.end().min(len).max(start);
    let slice = text
        .get(usize::from(start)..usize::from(end))
        .unwrap_or_default();
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    let start = start + TextSize::from(leading as u32);
    TextRange::at(start, TextSize::from(trimmed.len() as u32))
}
