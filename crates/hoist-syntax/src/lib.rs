//! Syntax model for C-family sources.
//!
//! This crate provides:
//! - [`SyntaxTree`]: an arena of typed nodes with resolved declarations, source ranges and
//!   macro-expansion provenance.
//! - [`SelectionTree`]: per-node coverage of a byte range selected by the user.
//! - [`parse`] / [`parse_with_options`]: a small front-end (lexer, object-like macros,
//!   binding-power parser) that builds trees from text.

mod lexer;
mod ops;
mod parser;
mod preprocess;
mod selection;
mod tree;
mod ty;

pub use lexer::{lex, Directive, Lexed, Token, TokenKind};
pub use ops::{BinaryOp, UnaryOp};
pub use parser::{parse, parse_with_options};
pub use selection::{Coverage, SelectionTree};
pub use text_size::{TextRange, TextSize};
pub use tree::{
    CastKind, Decl, DeclId, DeclKind, Dialect, ExpansionId, Node, NodeId, NodeKind,
    PropertyAccess, SyntaxTree,
};
pub use ty::{Nullability, Type};

/// Options that influence parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub dialect: Dialect,
}

impl ParseOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {range:?}")]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}
