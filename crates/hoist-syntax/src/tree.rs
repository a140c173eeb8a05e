//! Arena-backed syntax tree.
//!
//! The tree owns every node; parent links are plain indices used for upward queries only.
//! Besides structure, nodes carry the semantic facts the refactoring core needs: resolved
//! declarations, static types and the macro expansion a node's location token came from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ops::{BinaryOp, UnaryOp};
use crate::ty::Type;
use crate::TextRange;

macro_rules! index_type {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

index_type!(NodeId);
index_type!(DeclId);
index_type!(ExpansionId);

/// Language mode of a parsed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// C++11 and later: lambdas, methods with an implicit `this`, `auto`.
    #[default]
    Cxx,
    C,
    /// C with `@property` declarations.
    ObjC,
}

impl Dialect {
    /// Whether local variables may be declared with a deduced type.
    pub fn has_type_inference(self) -> bool {
        matches!(self, Dialect::Cxx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyAccess {
    Get,
    Set,
    /// Read-modify-write, e.g. `obj.count += 1` or `obj.count++`.
    CompoundSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    FunctionToPointerDecay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,

    FunctionDecl { decl: DeclId },
    RecordDecl { decl: DeclId },
    FieldDecl { decl: DeclId },
    PropertyDecl { decl: DeclId },
    VarDecl { decl: DeclId, init_capture: bool },
    ParmVarDecl { decl: DeclId },
    TemplateParam { decl: DeclId },
    /// A type as written in source. Children are the expressions of any `decltype`.
    TypeRef,
    /// `[[name(args)]]`; children are the argument expressions.
    Attribute,

    Compound,
    DeclStmt,
    If,
    While,
    Do,
    For,
    ForRange,
    Switch,
    Case,
    Default,
    Label,
    Attributed,
    Return,
    Break,
    Continue,
    Null,

    IntegerLiteral,
    FloatingLiteral,
    BoolLiteral,
    StringLiteral,
    CharLiteral,
    DeclRef { decl: DeclId },
    Member { member: DeclId, arrow: bool },
    This { implicit: bool },
    Call,
    Subscript,
    Paren,
    Unary { op: UnaryOp },
    Binary { op: BinaryOp },
    Conditional,
    ImplicitCast { cast: CastKind },
    /// Captures that were not written out but are introduced by a capture default.
    Lambda { implicit_captures: Vec<DeclId> },
    /// A simple (non-init) capture such as `x` or `&x`.
    LambdaCapture { decl: DeclId },
    RequiresClause,
    PropertyRef { property: DeclId, access: PropertyAccess },
}

impl NodeKind {
    pub fn is_expr(&self) -> bool {
        matches!(
            self,
            NodeKind::IntegerLiteral
                | NodeKind::FloatingLiteral
                | NodeKind::BoolLiteral
                | NodeKind::StringLiteral
                | NodeKind::CharLiteral
                | NodeKind::DeclRef { .. }
                | NodeKind::Member { .. }
                | NodeKind::This { .. }
                | NodeKind::Call
                | NodeKind::Subscript
                | NodeKind::Paren
                | NodeKind::Unary { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Conditional
                | NodeKind::ImplicitCast { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::PropertyRef { .. }
        )
    }

    /// Statements in the broad sense: every expression is also a statement.
    pub fn is_stmt(&self) -> bool {
        self.is_expr()
            || matches!(
                self,
                NodeKind::Compound
                    | NodeKind::DeclStmt
                    | NodeKind::If
                    | NodeKind::While
                    | NodeKind::Do
                    | NodeKind::For
                    | NodeKind::ForRange
                    | NodeKind::Switch
                    | NodeKind::Case
                    | NodeKind::Default
                    | NodeKind::Label
                    | NodeKind::Attributed
                    | NodeKind::Return
                    | NodeKind::Break
                    | NodeKind::Continue
                    | NodeKind::Null
            )
    }

    /// Variable declarations of any flavour (locals, globals, parameters, init captures).
    pub fn is_var_decl(&self) -> bool {
        matches!(self, NodeKind::VarDecl { .. } | NodeKind::ParmVarDecl { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Static type; set for expressions only.
    pub ty: Option<Type>,
    /// Macro expansion the node's location token was produced by.
    pub expansion: Option<ExpansionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Var { global: bool },
    Param,
    InitCapture,
    Function,
    Method,
    Field,
    Property,
    Record,
    TemplateParam,
    /// The call operator of a lambda's closure type.
    LambdaCallOperator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    /// Full range of the declaration (for variables: from the type to the end of the
    /// initializer).
    pub range: TextRange,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    text: String,
    dialect: Dialect,
    nodes: Vec<Node>,
    decls: Vec<Decl>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.node(id).ty.as_ref()
    }

    pub fn expansion(&self, id: NodeId) -> Option<ExpansionId> {
        self.node(id).expansion
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.idx()]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId::from_raw)
    }

    pub fn source_text(&self, range: TextRange) -> Option<&str> {
        self.text
            .get(usize::from(range.start())..usize::from(range.end()))
    }

    pub fn node_text(&self, id: NodeId) -> &str {
        self.source_text(self.range(id)).unwrap_or_default()
    }

    /// Steps down through implicit conversions.
    pub fn ignore_implicit(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::ImplicitCast { .. } = self.kind(id) {
            match self.children(id).first() {
                Some(&child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Steps up through implicit conversions wrapping `id`.
    pub fn outer_implicit(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.parent(id) {
            if !matches!(self.kind(parent), NodeKind::ImplicitCast { .. }) {
                break;
            }
            id = parent;
        }
        id
    }

    pub fn if_then(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::If => self.children(id).get(1).copied(),
            _ => None,
        }
    }

    pub fn if_else(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::If => self.children(id).get(2).copied(),
            _ => None,
        }
    }

    /// The body statement of a loop.
    pub fn loop_body(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Do => self.children(id).first().copied(),
            NodeKind::While | NodeKind::For | NodeKind::ForRange => {
                self.children(id).last().copied()
            }
            _ => None,
        }
    }

    /// The initializer expression of a variable or parameter declaration.
    pub fn var_init(&self, id: NodeId) -> Option<NodeId> {
        if !self.kind(id).is_var_decl() {
            return None;
        }
        self.children(id)
            .last()
            .copied()
            .filter(|&child| self.kind(child).is_expr())
    }

    pub fn binary_operands(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match (self.kind(id), self.children(id)) {
            (NodeKind::Binary { .. }, [lhs, rhs]) => Some((*lhs, *rhs)),
            _ => None,
        }
    }

    pub fn call_callee(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Call => self.children(id).first().copied(),
            _ => None,
        }
    }

    pub fn member_base(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Member { .. } | NodeKind::PropertyRef { .. } => {
                self.children(id).first().copied()
            }
            _ => None,
        }
    }

    pub fn lambda_body(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Lambda { .. } => self
                .children(id)
                .last()
                .copied()
                .filter(|&child| matches!(self.kind(child), NodeKind::Compound)),
            _ => None,
        }
    }

    /// Indented dump of the tree, one node per line, for tests and debugging.
    pub fn debug_dump(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let name = format!("{:?}", node.kind);
            let name = name
                .split(|c: char| c == ' ' || c == '{' || c == '(')
                .next()
                .unwrap_or_default();
            let _ = write!(out, "{:indent$}{name} {:?}", "", self.node_text(id), indent = depth * 2);
            if let Some(ty) = &node.ty {
                let _ = write!(out, " : {ty}");
            }
            out.push('\n');
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

/// Incrementally builds a [`SyntaxTree`] bottom-up: children are allocated before
/// their parent.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
    decls: Vec<Decl>,
}

impl TreeBuilder {
    pub(crate) fn node(
        &mut self,
        kind: NodeKind,
        range: TextRange,
        children: Vec<NodeId>,
        ty: Option<Type>,
        expansion: Option<ExpansionId>,
    ) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        for &child in &children {
            self.nodes[child.idx()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            range,
            parent: None,
            children,
            ty,
            expansion,
        });
        id
    }

    pub(crate) fn decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::from_raw(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub(crate) fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.idx()]
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub(crate) fn get_decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.idx()]
    }

    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.idx()].kind = kind;
    }

    pub(crate) fn finish(self, text: String, dialect: Dialect, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            text,
            dialect,
            nodes: self.nodes,
            decls: self.decls,
            root,
        }
    }
}
