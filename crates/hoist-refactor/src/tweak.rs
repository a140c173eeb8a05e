//! The code action surface: a [`Tweak`] is offered for a [`Selection`] and, once prepared,
//! produces an [`Effect`].

use hoist_config::ExtractVariableConfig;
use hoist_syntax::{NodeId, NodeKind, SelectionTree, SyntaxTree, TextRange, TextSize};
use serde::Serialize;
use thiserror::Error;

use crate::context::{ExtractError, ExtractionContext};
use crate::edit::{apply_text_edits, EditError, FileId, TextEdit, WorkspaceEdit};
use crate::eligibility::extraction_target;

pub const REFACTOR_KIND: &str = "refactor";

/// A user selection within one parsed file.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    file: FileId,
    tree: SelectionTree<'a>,
    raw: TextRange,
}

impl<'a> Selection<'a> {
    pub fn new(file: FileId, tree: &'a SyntaxTree, range: TextRange) -> Self {
        Self {
            file,
            tree: SelectionTree::new(tree, range),
            raw: range,
        }
    }

    /// Returns `None` if an offset does not fit in a [`TextSize`].
    pub fn from_offsets(
        file: FileId,
        tree: &'a SyntaxTree,
        start: usize,
        end: usize,
    ) -> Option<Self> {
        let start = TextSize::try_from(start).ok()?;
        let end = TextSize::try_from(end).ok()?.max(start);
        Some(Self::new(file, tree, TextRange::new(start, end)))
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn syntax(&self) -> &'a SyntaxTree {
        self.tree.tree()
    }

    pub fn selection_tree(&self) -> &SelectionTree<'a> {
        &self.tree
    }

    /// The selection as the user made it, before whitespace trimming.
    pub fn range(&self) -> TextRange {
        self.raw
    }
}

/// Edits produced by applying a tweak, all targeting the file the tweak ran on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Effect {
    pub file: FileId,
    pub edit: WorkspaceEdit,
}

impl Effect {
    pub fn main_file_edit(file: FileId, edits: Vec<TextEdit>) -> Result<Self, EditError> {
        let mut edit = WorkspaceEdit::new(edits);
        edit.normalize()?;
        Ok(Self { file, edit })
    }

    /// Applies the edits to `text`, the contents of [`Effect::file`].
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        let edits: Vec<TextEdit> = self.edit.edits_for(&self.file).cloned().collect();
        apply_text_edits(text, &edits)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TweakError {
    #[error("tweak was applied without a successful prepare")]
    NotPrepared,
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A code action that is first checked for availability and then applied.
pub trait Tweak {
    fn id(&self) -> &'static str;

    fn title(&self) -> String;

    fn kind(&self) -> &'static str {
        REFACTOR_KIND
    }

    /// Cheap availability check. Returns `true` if [`Tweak::apply`] may be called.
    fn prepare(&mut self, selection: &Selection<'_>) -> bool;

    fn apply(&mut self, selection: &Selection<'_>) -> Result<Effect, TweakError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// `nodes` and `range` identify the tree `expr` was found in.
    Prepared {
        expr: NodeId,
        nodes: usize,
        range: TextRange,
    },
    Applied,
    Rejected,
}

/// Extracts the selected subexpression into a local variable declared in front of the
/// enclosing statement.
///
/// ```text
/// before: return a + b * c;        (`b * c` selected)
/// after:  auto placeholder = b * c; return a + placeholder;
/// ```
#[derive(Debug, Clone)]
pub struct ExtractVariable {
    config: ExtractVariableConfig,
    state: State,
}

impl Default for ExtractVariable {
    fn default() -> Self {
        Self::new(ExtractVariableConfig::default())
    }
}

impl ExtractVariable {
    pub const ID: &'static str = "ExtractVariable";

    pub fn new(config: ExtractVariableConfig) -> Self {
        Self {
            config,
            state: State::Idle,
        }
    }

    pub fn config(&self) -> &ExtractVariableConfig {
        &self.config
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.state, State::Prepared { .. })
    }

    fn decline(&mut self, selection: &Selection<'_>, reason: &dyn std::fmt::Display) -> bool {
        tracing::debug!(
            target = "hoist.refactor",
            file = %selection.file(),
            range = ?selection.range(),
            reason = %reason,
            "extract variable not available"
        );
        self.state = State::Rejected;
        false
    }
}

impl Tweak for ExtractVariable {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn title(&self) -> String {
        "Extract subexpression to variable".to_string()
    }

    fn prepare(&mut self, selection: &Selection<'_>) -> bool {
        if !self.config.enabled {
            return self.decline(selection, &"disabled by configuration");
        }
        // The raw range: a whitespace-only selection is not empty and is declined below.
        if selection.range().is_empty() {
            return self.decline(selection, &"empty selection");
        }
        let tree = selection.selection_tree();
        let Some(ancestor) = tree.common_ancestor() else {
            return self.decline(selection, &"nothing selected");
        };
        let expr = match extraction_target(tree, ancestor) {
            Ok(expr) => expr,
            Err(reason) => return self.decline(selection, &reason),
        };

        let context = ExtractionContext::new(tree, selection.file().clone(), expr);
        if context.insertion_point().is_none() {
            return self.decline(selection, &"no statement to insert the declaration before");
        }
        if context.variable_type().is_none() {
            return self.decline(selection, &"type cannot be spelled");
        }

        let range = tree.tree().range(expr);
        tracing::debug!(
            target = "hoist.refactor",
            file = %selection.file(),
            expr = ?range,
            referenced = context.referenced_decls().len(),
            "extract variable available"
        );
        self.state = State::Prepared {
            expr,
            nodes: tree.tree().len(),
            range,
        };
        true
    }

    fn apply(&mut self, selection: &Selection<'_>) -> Result<Effect, TweakError> {
        let State::Prepared {
            expr,
            nodes,
            range: prepared_range,
        } = self.state
        else {
            return Err(TweakError::NotPrepared);
        };
        let tree = selection.selection_tree();
        let syntax = selection.syntax();
        if syntax.len() != nodes || syntax.range(expr) != prepared_range {
            return Err(TweakError::NotPrepared);
        }
        let context = ExtractionContext::new(tree, selection.file().clone(), expr);
        if !context.is_extractable() {
            self.state = State::Rejected;
            return Err(ExtractError::NotExtractable.into());
        }

        let range = context.extraction_range();
        // A whole expression statement is replaced by the declaration. Part of one, picked
        // out of an operator chain, is still replaced by the variable.
        let outer = syntax.outer_implicit(context.expr());
        let is_expr_stmt = range == syntax.range(context.expr())
            && syntax
                .parent(outer)
                .is_some_and(|parent| syntax.kind(parent) == &NodeKind::Compound);

        let name = self.config.variable_name.as_str();
        let declaration = context.insert_declaration(name, range, !is_expr_stmt)?;
        let replacement = context.replace_with_var(range, if is_expr_stmt { "" } else { name })?;
        let effect = Effect::main_file_edit(selection.file().clone(), vec![declaration, replacement])
            .map_err(ExtractError::from)?;

        self.state = State::Applied;
        Ok(effect)
    }
}
