use hoist_syntax::{DeclId, NodeId, NodeKind, PropertyAccess, SelectionTree, SyntaxTree, Type};
use thiserror::Error;

use crate::binary_range::binary_operator_range;
use crate::edit::{EditError, FileId, TextEdit, TextRange};
use crate::insertion::insertion_point;
use crate::references::referenced_decls;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("expression cannot be extracted")]
    NotExtractable,
    #[error("range {range:?} does not map to source text")]
    InvalidRange { range: TextRange },
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Everything needed to extract one expression into a variable.
#[derive(Debug)]
pub struct ExtractionContext<'a> {
    selection: &'a SelectionTree<'a>,
    file: FileId,
    expr: NodeId,
    ty: Option<Type>,
    referenced: Vec<DeclId>,
    insertion_point: Option<NodeId>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(selection: &'a SelectionTree<'a>, file: FileId, expr: NodeId) -> Self {
        let tree = selection.tree();
        let ty = variable_type(tree, expr);
        let referenced = referenced_decls(tree, expr);
        let insertion_point = insertion_point(tree, expr, &referenced);
        Self {
            selection,
            file,
            expr,
            ty,
            referenced,
            insertion_point,
        }
    }

    pub fn expr(&self) -> NodeId {
        self.expr
    }

    /// The type the new variable is declared with.
    pub fn variable_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn referenced_decls(&self) -> &[DeclId] {
        &self.referenced
    }

    /// The statement the declaration is inserted in front of.
    pub fn insertion_point(&self) -> Option<NodeId> {
        self.insertion_point
    }

    pub fn is_extractable(&self) -> bool {
        self.insertion_point.is_some() && self.ty.is_some()
    }

    /// The source range replaced by the variable: the expression itself, or the selected
    /// operands of an associative operator chain.
    pub fn extraction_range(&self) -> hoist_syntax::TextRange {
        binary_operator_range(self.selection, self.expr)
            .unwrap_or_else(|| self.selection.tree().range(self.expr))
    }

    /// Replaces `range` with a reference to the variable `name`.
    pub fn replace_with_var(
        &self,
        range: hoist_syntax::TextRange,
        name: &str,
    ) -> Result<TextEdit, ExtractError> {
        let tree = self.selection.tree();
        if tree.source_text(range).is_none() {
            return Err(ExtractError::InvalidRange {
                range: range.into(),
            });
        }
        Ok(TextEdit::replace(self.file.clone(), range.into(), name))
    }

    /// Declares `name` initialized with the text of `init`, in front of the insertion point.
    pub fn insert_declaration(
        &self,
        name: &str,
        init: hoist_syntax::TextRange,
        add_semicolon: bool,
    ) -> Result<TextEdit, ExtractError> {
        let tree = self.selection.tree();
        let (Some(point), Some(ty)) = (self.insertion_point, &self.ty) else {
            return Err(ExtractError::NotExtractable);
        };
        let code = tree.source_text(init).ok_or(ExtractError::InvalidRange {
            range: init.into(),
        })?;

        let mut declaration = format!("{} = {code}", ty.render_declaration(name));
        if add_semicolon {
            declaration.push_str("; ");
        }
        let offset = usize::from(tree.range(point).start());
        Ok(TextEdit::insert(self.file.clone(), offset, declaration))
    }
}

/// The declared type for a variable initialized with `expr`, or `None` if it cannot be
/// written out.
///
/// C++ deduces the type with `auto`. Elsewhere the expression's own type is used without its
/// outer nullability; property references contribute the property's type, but only when they
/// are read.
pub fn variable_type(tree: &SyntaxTree, expr: NodeId) -> Option<Type> {
    if tree.dialect().has_type_inference() {
        return Some(Type::Auto);
    }
    let ty = match (tree.kind(expr), tree.ty(expr)?) {
        (
            NodeKind::PropertyRef {
                property,
                access: PropertyAccess::Get,
            },
            _,
        ) => &tree.decl(*property).ty,
        (_, Type::PseudoObject) => return None,
        (_, ty) => ty,
    };
    let ty = ty.strip_outer_nullability();
    ty.is_spellable().then(|| ty.clone())
}
