use std::collections::{HashMap, HashSet};

use text_size::TextSize;

use crate::lexer::{lex, Token, TokenKind};
use crate::ops::{BinaryOp, UnaryOp};
use crate::preprocess::Preprocessor;
use crate::tree::{
    CastKind, Decl, DeclId, DeclKind, Dialect, ExpansionId, NodeId, NodeKind, PropertyAccess,
    SyntaxTree, TreeBuilder,
};
use crate::ty::{Nullability, Type};
use crate::{ParseError, ParseOptions, TextRange};

/// Parses `text` as C++.
pub fn parse(text: &str) -> Result<SyntaxTree, ParseError> {
    parse_with_options(text, ParseOptions::default())
}

pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<SyntaxTree, ParseError> {
    let tokens = Preprocessor::default().run(lex(text)?, text.len())?;
    Parser::new(tokens, options.dialect).parse(text)
}

type PResult<T> = Result<T, ParseError>;

const TYPE_KEYWORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "auto", "signed",
    "unsigned",
];

const KEYWORDS: &[&str] = &[
    "if", "else", "while", "do", "for", "switch", "case", "default", "return", "break",
    "continue", "struct", "this", "true", "false", "decltype", "requires", "typename", "class",
    "const",
];

const CONDITIONAL_BP: u8 = 4;
const LOGICAL_OR_BP: u8 = 10;
const SHIFT_BP: u8 = 24;

fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text) || TYPE_KEYWORDS.contains(&text)
}

fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8, BinaryOp)> {
    // Returns (left_bp, right_bp, op). Larger = tighter binding.
    let (l, r, op) = match kind {
        TokenKind::Star => (28, 29, BinaryOp::Mul),
        TokenKind::Slash => (28, 29, BinaryOp::Div),
        TokenKind::Percent => (28, 29, BinaryOp::Rem),
        TokenKind::Plus => (26, 27, BinaryOp::Add),
        TokenKind::Minus => (26, 27, BinaryOp::Sub),
        TokenKind::Shl => (SHIFT_BP, SHIFT_BP + 1, BinaryOp::Shl),
        TokenKind::Shr => (SHIFT_BP, SHIFT_BP + 1, BinaryOp::Shr),
        TokenKind::Less => (22, 23, BinaryOp::Lt),
        TokenKind::Greater => (22, 23, BinaryOp::Gt),
        TokenKind::LessEq => (22, 23, BinaryOp::Le),
        TokenKind::GreaterEq => (22, 23, BinaryOp::Ge),
        TokenKind::EqEq => (20, 21, BinaryOp::Eq),
        TokenKind::BangEq => (20, 21, BinaryOp::Ne),
        TokenKind::Amp => (18, 19, BinaryOp::And),
        TokenKind::Caret => (16, 17, BinaryOp::Xor),
        TokenKind::Pipe => (14, 15, BinaryOp::Or),
        TokenKind::AmpAmp => (12, 13, BinaryOp::LAnd),
        TokenKind::PipePipe => (LOGICAL_OR_BP, LOGICAL_OR_BP + 1, BinaryOp::LOr),

        // Assignment (right-associative).
        TokenKind::Eq => (2, 2, BinaryOp::Assign),
        TokenKind::StarEq => (2, 2, BinaryOp::MulAssign),
        TokenKind::SlashEq => (2, 2, BinaryOp::DivAssign),
        TokenKind::PercentEq => (2, 2, BinaryOp::RemAssign),
        TokenKind::PlusEq => (2, 2, BinaryOp::AddAssign),
        TokenKind::MinusEq => (2, 2, BinaryOp::SubAssign),
        TokenKind::ShlEq => (2, 2, BinaryOp::ShlAssign),
        TokenKind::ShrEq => (2, 2, BinaryOp::ShrAssign),
        TokenKind::AmpEq => (2, 2, BinaryOp::AndAssign),
        TokenKind::CaretEq => (2, 2, BinaryOp::XorAssign),
        TokenKind::PipeEq => (2, 2, BinaryOp::OrAssign),

        _ => return None,
    };
    Some((l, r, op))
}

fn promote(ty: &Type) -> Type {
    match ty.strip_outer_nullability() {
        Type::Bool | Type::Char | Type::Int => Type::Int,
        other => other.clone(),
    }
}

fn arithmetic_conversion(lhs: &Type, rhs: &Type) -> Type {
    let (lhs, rhs) = (promote(lhs), promote(rhs));
    if lhs == Type::Double || rhs == Type::Double {
        Type::Double
    } else if lhs == Type::Float || rhs == Type::Float {
        Type::Float
    } else if lhs == Type::Long || rhs == Type::Long {
        Type::Long
    } else {
        Type::Int
    }
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    start: TextSize,
    expansion: Option<ExpansionId>,
}

#[derive(Debug, Clone, Copy)]
enum Resolution {
    Local { decl: DeclId, depth: usize },
    Member(DeclId),
    Global(DeclId),
}

#[derive(Debug, Default)]
struct Scope {
    names: HashMap<String, DeclId>,
    types: HashMap<String, Type>,
}

#[derive(Debug)]
struct LambdaFrame {
    /// Index of the lambda's own scope; declarations in shallower scopes are captured.
    scope_depth: usize,
    has_default: bool,
    explicit: HashSet<DeclId>,
    implicit: Vec<DeclId>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
    builder: TreeBuilder,
    scopes: Vec<Scope>,
    records: HashMap<String, HashMap<String, DeclId>>,
    current_record: Option<String>,
    lambdas: Vec<LambdaFrame>,
    lambda_operators: HashMap<NodeId, DeclId>,
    /// Depth of `decltype`/`requires` operands, which never capture.
    unevaluated: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        Self {
            tokens,
            pos: 0,
            dialect,
            builder: TreeBuilder::default(),
            scopes: vec![Scope::default()],
            records: HashMap::new(),
            current_record: None,
            lambdas: Vec::new(),
            lambda_operators: HashMap::new(),
            unevaluated: 0,
        }
    }

    fn parse(mut self, text: &str) -> PResult<SyntaxTree> {
        let mut items = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if self.at_ident("struct")
                && self.nth(1).kind == TokenKind::Ident
                && self.nth(2).kind == TokenKind::LBrace
            {
                items.push(self.record()?);
                continue;
            }
            items.extend(self.external_declaration()?);
        }

        let range = TextRange::new(TextSize::from(0), TextSize::from(text.len() as u32));
        let root = self
            .builder
            .node(NodeKind::TranslationUnit, range, items, None, None);
        let dialect = self.dialect;
        Ok(self.builder.finish(text.to_owned(), dialect, root))
    }

    // --- token helpers ---

    fn current(&self) -> &Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn at_ident(&self, text: &str) -> bool {
        self.current().is_ident(text)
    }

    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            range: self.current().range,
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<Token> {
        if self.at_ident(keyword) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected `{keyword}`")))
        }
    }

    fn expect_name(&mut self) -> PResult<Token> {
        let token = self.current();
        if token.kind == TokenKind::Ident && !is_keyword(&token.text) {
            Ok(self.bump())
        } else {
            Err(self.error_here("expected identifier"))
        }
    }

    fn mark(&self) -> Mark {
        let token = self.current();
        Mark {
            start: token.range.start(),
            expansion: token.expansion,
        }
    }

    fn mark_token(token: &Token) -> Mark {
        Mark {
            start: token.range.start(),
            expansion: token.expansion,
        }
    }

    fn range_from(&self, mark: Mark) -> TextRange {
        let end = self
            .pos
            .checked_sub(1)
            .map(|idx| self.tokens[idx].range.end())
            .unwrap_or(mark.start);
        TextRange::new(mark.start, end.max(mark.start))
    }

    fn finish_node(
        &mut self,
        mark: Mark,
        kind: NodeKind,
        children: Vec<NodeId>,
        ty: Option<Type>,
    ) -> NodeId {
        let range = self.range_from(mark);
        self.builder.node(kind, range, children, ty, mark.expansion)
    }

    // --- scopes ---

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, decl: DeclId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string(), decl);
        }
    }

    fn declare_type(&mut self, name: &str, ty: Type) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.types.insert(name.to_string(), ty);
        }
    }

    fn declare_member(&mut self, name: &str, decl: DeclId) {
        if let Some(record) = &self.current_record {
            if let Some(members) = self.records.get_mut(record) {
                members.insert(name.to_string(), decl);
            }
        }
    }

    fn resolve(&self, name: &str) -> Option<Resolution> {
        for depth in (1..self.scopes.len()).rev() {
            if let Some(&decl) = self.scopes[depth].names.get(name) {
                return Some(Resolution::Local { decl, depth });
            }
        }
        if let Some(record) = &self.current_record {
            if let Some(&decl) = self.records.get(record).and_then(|members| members.get(name)) {
                return Some(Resolution::Member(decl));
            }
        }
        self.scopes
            .first()
            .and_then(|scope| scope.names.get(name))
            .map(|&decl| Resolution::Global(decl))
    }

    fn lookup_type(&self, name: &str) -> Option<Type> {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.types.get(name) {
                return Some(ty.clone());
            }
        }
        self.records.contains_key(name).then(|| self.record_type(name))
    }

    fn record_type(&self, name: &str) -> Type {
        Type::Record {
            name: name.to_string(),
            elaborated: self.dialect != Dialect::Cxx,
        }
    }

    /// Records that the innermost lambdas reference `decl`, declared at scope `depth`.
    fn note_capture(&mut self, decl: DeclId, depth: usize, token: &Token) -> PResult<()> {
        if self.unevaluated > 0 {
            return Ok(());
        }
        let is_local = matches!(
            self.builder.get_decl(decl).kind,
            DeclKind::Var { global: false } | DeclKind::Param | DeclKind::InitCapture
        );
        if !is_local {
            return Ok(());
        }
        for frame in &mut self.lambdas {
            if frame.scope_depth <= depth || frame.explicit.contains(&decl) {
                continue;
            }
            if !frame.has_default {
                return Err(ParseError {
                    message: format!(
                        "variable `{}` cannot be implicitly captured in a lambda with no capture-default",
                        token.text
                    ),
                    range: token.range,
                });
            }
            if !frame.implicit.contains(&decl) {
                frame.implicit.push(decl);
            }
        }
        Ok(())
    }

    // --- types ---

    fn at_type_start(&self) -> bool {
        let token = self.current();
        if token.kind != TokenKind::Ident {
            return false;
        }
        let text = token.text.as_str();
        TYPE_KEYWORDS.contains(&text)
            || matches!(text, "struct" | "const" | "decltype")
            || self.lookup_type(text).is_some()
    }

    fn parse_type(&mut self) -> PResult<(NodeId, Type)> {
        let mark = self.mark();
        let mut children = Vec::new();
        while self.at_ident("const") {
            self.bump();
        }

        let token = self.bump();
        if token.kind != TokenKind::Ident {
            return Err(ParseError {
                message: "expected type".to_string(),
                range: token.range,
            });
        }
        let mut ty = match token.text.as_str() {
            "void" => Type::Void,
            "bool" => Type::Bool,
            "char" => Type::Char,
            "short" | "int" => Type::Int,
            "long" => {
                if self.at_ident("long") {
                    self.bump();
                }
                Type::Long
            }
            "float" => Type::Float,
            "double" => Type::Double,
            "auto" => Type::Auto,
            "signed" | "unsigned" => {
                let ty = match self.current().text.as_str() {
                    "char" => Type::Char,
                    "long" => Type::Long,
                    _ => Type::Int,
                };
                if ["char", "short", "int", "long"]
                    .iter()
                    .any(|kw| self.at_ident(kw))
                {
                    self.bump();
                }
                ty
            }
            "struct" => {
                let name = self.expect_name()?;
                if !self.records.contains_key(&name.text) {
                    return Err(ParseError {
                        message: format!("unknown struct `{}`", name.text),
                        range: name.range,
                    });
                }
                self.record_type(&name.text)
            }
            "decltype" => {
                self.expect(TokenKind::LParen, "expected `(` after `decltype`")?;
                self.unevaluated += 1;
                let operand = self.expr();
                self.unevaluated -= 1;
                let operand = operand?;
                self.expect(TokenKind::RParen, "expected `)` after `decltype` operand")?;
                children.push(operand);
                self.value_type(operand)
            }
            name => self.lookup_type(name).ok_or_else(|| ParseError {
                message: format!("unknown type `{name}`"),
                range: token.range,
            })?,
        };

        loop {
            if self.eat(TokenKind::Star) {
                ty = Type::pointer_to(ty);
            } else if self.at_ident("_Nullable") || self.at_ident("_Nonnull") {
                let nullability = if self.bump().text == "_Nullable" {
                    Nullability::Nullable
                } else {
                    Nullability::Nonnull
                };
                ty = Type::Nullable {
                    inner: Box::new(ty),
                    nullability,
                };
            } else if self.at_ident("const") || self.at(TokenKind::Amp) {
                // Qualifiers and references do not change the value type.
                self.bump();
            } else {
                break;
            }
        }

        let node = self.finish_node(mark, NodeKind::TypeRef, children, None);
        Ok((node, ty))
    }

    // --- declarations ---

    fn external_declaration(&mut self) -> PResult<Vec<NodeId>> {
        let mark = self.mark();
        let (type_node, ty) = self.parse_type()?;
        let name = self.expect_name()?;
        if self.at(TokenKind::LParen) {
            let function = self.function_rest(mark, type_node, ty, name, DeclKind::Function)?;
            return Ok(vec![function]);
        }
        let decls = self.declarators(mark, type_node, ty, name, true)?;
        self.expect(TokenKind::Semicolon, "expected `;` after declaration")?;
        Ok(decls)
    }

    fn record(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.expect_keyword("struct")?;
        let name = self.expect_name()?;
        let ty = self.record_type(&name.text);
        let decl = self.builder.decl(Decl {
            name: name.text.clone(),
            kind: DeclKind::Record,
            range: name.range,
            ty,
        });
        self.records.insert(name.text.clone(), HashMap::new());
        self.expect(TokenKind::LBrace, "expected `{` after struct name")?;

        let previous = self.current_record.replace(name.text.clone());
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.error_here("expected `}` at end of struct"));
            }
            members.push(self.member()?);
        }
        self.current_record = previous;

        self.bump();
        self.expect(TokenKind::Semicolon, "expected `;` after struct definition")?;
        let node = self.finish_node(mark, NodeKind::RecordDecl { decl }, members, None);
        self.builder.decl_mut(decl).range = self.builder.get(node).range;
        Ok(node)
    }

    fn member(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let property = self.at(TokenKind::At) && self.nth(1).is_ident("property");
        if property {
            if self.dialect != Dialect::ObjC {
                return Err(self.error_here("`@property` requires Objective-C"));
            }
            self.bump();
            self.bump();
        }

        let (type_node, ty) = self.parse_type()?;
        let name = self.expect_name()?;
        if !property && self.at(TokenKind::LParen) {
            if self.dialect != Dialect::Cxx {
                return Err(self.error_here("member functions require C++"));
            }
            return self.function_rest(mark, type_node, ty, name, DeclKind::Method);
        }
        self.expect(TokenKind::Semicolon, "expected `;` after member declaration")?;

        let range = self.range_from(mark);
        let kind = if property {
            DeclKind::Property
        } else {
            DeclKind::Field
        };
        let decl = self.builder.decl(Decl {
            name: name.text.clone(),
            kind,
            range,
            ty,
        });
        self.declare_member(&name.text, decl);
        let node_kind = if property {
            NodeKind::PropertyDecl { decl }
        } else {
            NodeKind::FieldDecl { decl }
        };
        Ok(self
            .builder
            .node(node_kind, range, vec![type_node], None, mark.expansion))
    }

    fn function_rest(
        &mut self,
        mark: Mark,
        type_node: NodeId,
        ret: Type,
        name: Token,
        kind: DeclKind,
    ) -> PResult<NodeId> {
        let decl = self.builder.decl(Decl {
            name: name.text.clone(),
            kind,
            range: name.range,
            ty: Type::Function { ret: Box::new(ret) },
        });
        if kind == DeclKind::Method {
            self.declare_member(&name.text, decl);
        } else {
            self.declare(&name.text, decl);
        }

        self.push_scope();
        let result = self.function_signature_and_body(type_node);
        self.pop_scope();
        let children = result?;

        let node = self.finish_node(mark, NodeKind::FunctionDecl { decl }, children, None);
        self.builder.decl_mut(decl).range = self.builder.get(node).range;
        Ok(node)
    }

    fn function_signature_and_body(&mut self, type_node: NodeId) -> PResult<Vec<NodeId>> {
        let mut children = vec![type_node];
        children.extend(self.parameters()?);
        if self.at(TokenKind::LBrace) {
            children.push(self.compound()?);
        } else {
            self.expect(TokenKind::Semicolon, "expected function body or `;`")?;
        }
        Ok(children)
    }

    fn parameters(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen, "expected `(`")?;
        let mut params = Vec::new();
        if self.at_ident("void") && self.nth(1).kind == TokenKind::RParen {
            self.bump();
        }
        while !self.at(TokenKind::RParen) {
            params.push(self.parameter()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "expected `)` after parameters")?;
        Ok(params)
    }

    fn parameter(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let mut children = self.attributes()?;
        let (type_node, ty) = self.parse_type()?;
        children.push(type_node);
        let name = if self.current().kind == TokenKind::Ident && !is_keyword(&self.current().text)
        {
            Some(self.bump())
        } else {
            None
        };
        if self.eat(TokenKind::Eq) {
            children.push(self.expr()?);
        }

        let range = self.range_from(mark);
        let decl = self.builder.decl(Decl {
            name: name.as_ref().map(|n| n.text.clone()).unwrap_or_default(),
            kind: DeclKind::Param,
            range,
            ty,
        });
        if let Some(name) = &name {
            self.declare(&name.text, decl);
        }
        Ok(self.builder.node(
            NodeKind::ParmVarDecl { decl },
            range,
            children,
            None,
            mark.expansion,
        ))
    }

    /// `[[name]]`, `[[ns::name(args), other]]`, ...
    fn attributes(&mut self) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        while self.at(TokenKind::LBracket) && self.nth(1).kind == TokenKind::LBracket {
            let mark = self.mark();
            self.bump();
            self.bump();
            let mut args = Vec::new();
            while !self.at(TokenKind::RBracket) {
                self.expect(TokenKind::Ident, "expected attribute name")?;
                while self.at(TokenKind::Colon) && self.nth(1).kind == TokenKind::Colon {
                    self.bump();
                    self.bump();
                    self.expect(TokenKind::Ident, "expected attribute name")?;
                }
                if self.eat(TokenKind::LParen) {
                    while !self.at(TokenKind::RParen) {
                        args.push(self.expr()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen, "expected `)` after attribute arguments")?;
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBracket, "expected `]]`")?;
            self.expect(TokenKind::RBracket, "expected `]]`")?;
            out.push(self.finish_node(mark, NodeKind::Attribute, args, None));
        }
        Ok(out)
    }

    /// Parses the declarators of a declaration whose type and first name were already read.
    fn declarators(
        &mut self,
        mark: Mark,
        type_node: NodeId,
        ty: Type,
        first: Token,
        global: bool,
    ) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut name = first;
        let mut decl_mark = mark;
        let mut type_child = Some(type_node);
        loop {
            let mut children: Vec<NodeId> = type_child.take().into_iter().collect();
            let mut var_ty = ty.clone();
            if self.eat(TokenKind::Eq) {
                let init = self.expr()?;
                if var_ty == Type::Auto {
                    var_ty = self.value_type(init);
                }
                children.push(init);
            }

            let range = self.range_from(decl_mark);
            let decl = self.builder.decl(Decl {
                name: name.text.clone(),
                kind: DeclKind::Var { global },
                range,
                ty: var_ty,
            });
            self.declare(&name.text, decl);
            out.push(self.builder.node(
                NodeKind::VarDecl {
                    decl,
                    init_capture: false,
                },
                range,
                children,
                None,
                decl_mark.expansion,
            ));

            if !self.eat(TokenKind::Comma) {
                break;
            }
            name = self.expect_name()?;
            decl_mark = Self::mark_token(&name);
        }
        Ok(out)
    }

    // --- statements ---

    fn statement(&mut self) -> PResult<NodeId> {
        match self.current().kind {
            TokenKind::LBrace => return self.compound(),
            TokenKind::Semicolon => {
                let mark = self.mark();
                self.bump();
                return Ok(self.finish_node(mark, NodeKind::Null, Vec::new(), None));
            }
            TokenKind::LBracket if self.nth(1).kind == TokenKind::LBracket => {
                return self.attributed();
            }
            TokenKind::Ident => {}
            _ => return self.expression_statement(),
        }

        let keyword = self.current().text.clone();
        match keyword.as_str() {
            "if" => self.if_statement(),
            "while" => self.while_statement(),
            "do" => self.do_statement(),
            "for" => self.for_statement(),
            "switch" => self.switch_statement(),
            "case" => self.case_statement(),
            "default" => self.default_statement(),
            "return" => self.return_statement(),
            "break" => self.jump(NodeKind::Break),
            "continue" => self.jump(NodeKind::Continue),
            _ if self.nth(1).kind == TokenKind::Colon
                && self.nth(2).kind != TokenKind::Colon
                && !self.at_type_start() =>
            {
                self.label()
            }
            _ if self.at_type_start() => self.declaration_statement(),
            _ => self.expression_statement(),
        }
    }

    fn compound(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.expect(TokenKind::LBrace, "expected `{`")?;
        self.push_scope();
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.error_here("expected `}`"));
            }
            statements.push(self.statement()?);
        }
        self.pop_scope();
        self.bump();
        Ok(self.finish_node(mark, NodeKind::Compound, statements, None))
    }

    fn attributed(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let mut children = self.attributes()?;
        children.push(self.statement()?);
        Ok(self.finish_node(mark, NodeKind::Attributed, children, None))
    }

    fn parenthesized_condition(&mut self, keyword: &str) -> PResult<NodeId> {
        self.expect(TokenKind::LParen, &format!("expected `(` after `{keyword}`"))?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "expected `)` after condition")?;
        Ok(cond)
    }

    fn if_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let cond = self.parenthesized_condition("if")?;
        let then_branch = self.statement()?;
        let mut children = vec![cond, then_branch];
        if self.at_ident("else") {
            self.bump();
            children.push(self.statement()?);
        }
        Ok(self.finish_node(mark, NodeKind::If, children, None))
    }

    fn while_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let cond = self.parenthesized_condition("while")?;
        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::While, vec![cond, body], None))
    }

    fn do_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let body = self.statement()?;
        self.expect_keyword("while")?;
        let cond = self.parenthesized_condition("while")?;
        self.expect(TokenKind::Semicolon, "expected `;` after do-while")?;
        Ok(self.finish_node(mark, NodeKind::Do, vec![body, cond], None))
    }

    fn for_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        self.expect(TokenKind::LParen, "expected `(` after `for`")?;
        self.push_scope();
        let result = self.for_rest(mark);
        self.pop_scope();
        result
    }

    fn for_rest(&mut self, mark: Mark) -> PResult<NodeId> {
        let mut children = Vec::new();
        if self.eat(TokenKind::Semicolon) {
            // No init statement.
        } else if self.at_type_start() {
            let decl_mark = self.mark();
            let (type_node, ty) = self.parse_type()?;
            let name = self.expect_name()?;
            if self.eat(TokenKind::Colon) {
                return self.range_for_rest(mark, decl_mark, type_node, ty, name);
            }
            let decls = self.declarators(decl_mark, type_node, ty, name, false)?;
            self.expect(TokenKind::Semicolon, "expected `;` in for statement")?;
            children.push(self.finish_node(decl_mark, NodeKind::DeclStmt, decls, None));
        } else {
            children.push(self.expr()?);
            self.expect(TokenKind::Semicolon, "expected `;` in for statement")?;
        }

        if !self.at(TokenKind::Semicolon) {
            children.push(self.expr()?);
        }
        self.expect(TokenKind::Semicolon, "expected `;` in for statement")?;
        if !self.at(TokenKind::RParen) {
            children.push(self.expr()?);
        }
        self.expect(TokenKind::RParen, "expected `)` after for clauses")?;
        children.push(self.statement()?);
        Ok(self.finish_node(mark, NodeKind::For, children, None))
    }

    fn range_for_rest(
        &mut self,
        mark: Mark,
        decl_mark: Mark,
        type_node: NodeId,
        ty: Type,
        name: Token,
    ) -> PResult<NodeId> {
        let var_range = TextRange::new(decl_mark.start, name.range.end());
        let range_expr = self.expr()?;
        self.expect(TokenKind::RParen, "expected `)` after range")?;

        let var_ty = if ty == Type::Auto {
            self.value_type(range_expr)
                .pointee()
                .cloned()
                .unwrap_or(Type::Int)
        } else {
            ty
        };
        let decl = self.builder.decl(Decl {
            name: name.text.clone(),
            kind: DeclKind::Var { global: false },
            range: var_range,
            ty: var_ty,
        });
        self.declare(&name.text, decl);
        let var = self.builder.node(
            NodeKind::VarDecl {
                decl,
                init_capture: false,
            },
            var_range,
            vec![type_node],
            None,
            decl_mark.expansion,
        );

        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::ForRange, vec![var, range_expr, body], None))
    }

    fn switch_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let cond = self.parenthesized_condition("switch")?;
        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::Switch, vec![cond, body], None))
    }

    fn case_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let value = self.expr()?;
        self.expect(TokenKind::Colon, "expected `:` after case value")?;
        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::Case, vec![value, body], None))
    }

    fn default_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        self.expect(TokenKind::Colon, "expected `:` after `default`")?;
        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::Default, vec![body], None))
    }

    fn label(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        self.bump();
        let body = self.statement()?;
        Ok(self.finish_node(mark, NodeKind::Label, vec![body], None))
    }

    fn return_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        let mut children = Vec::new();
        if !self.at(TokenKind::Semicolon) {
            children.push(self.expr()?);
        }
        self.expect(TokenKind::Semicolon, "expected `;` after return")?;
        Ok(self.finish_node(mark, NodeKind::Return, children, None))
    }

    fn jump(&mut self, kind: NodeKind) -> PResult<NodeId> {
        let mark = self.mark();
        self.bump();
        self.expect(TokenKind::Semicolon, "expected `;`")?;
        Ok(self.finish_node(mark, kind, Vec::new(), None))
    }

    fn declaration_statement(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let (type_node, ty) = self.parse_type()?;
        let name = self.expect_name()?;
        let decls = self.declarators(mark, type_node, ty, name, false)?;
        self.expect(TokenKind::Semicolon, "expected `;` after declaration")?;
        Ok(self.finish_node(mark, NodeKind::DeclStmt, decls, None))
    }

    /// The expression itself is the statement; the `;` belongs to no node.
    fn expression_statement(&mut self) -> PResult<NodeId> {
        let expr = self.expr()?;
        self.expect(TokenKind::Semicolon, "expected `;` after expression")?;
        Ok(expr)
    }

    // --- expressions ---

    fn expr(&mut self) -> PResult<NodeId> {
        self.expr_bp(0)
    }

    fn expr_bp(&mut self, min_bp: u8) -> PResult<NodeId> {
        let mut lhs = self.unary()?;
        loop {
            let kind = self.current().kind;
            if kind == TokenKind::Question {
                if CONDITIONAL_BP < min_bp {
                    break;
                }
                self.bump();
                let then_branch = self.expr()?;
                self.expect(TokenKind::Colon, "expected `:` in conditional expression")?;
                let else_branch = self.expr_bp(CONDITIONAL_BP)?;
                let ty = self.value_type(then_branch);
                let lhs_node = self.builder.get(lhs);
                let (start, expansion) = (lhs_node.range.start(), lhs_node.expansion);
                let range = TextRange::new(start, self.builder.get(else_branch).range.end());
                lhs = self.builder.node(
                    NodeKind::Conditional,
                    range,
                    vec![lhs, then_branch, else_branch],
                    Some(ty),
                    expansion,
                );
                continue;
            }

            let Some((l_bp, r_bp, op)) = infix_binding_power(kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let operator = self.bump();
            let rhs = self.expr_bp(r_bp)?;
            lhs = self.binary(lhs, op, rhs, operator.expansion);
        }
        Ok(lhs)
    }

    fn binary(
        &mut self,
        lhs: NodeId,
        op: BinaryOp,
        rhs: NodeId,
        expansion: Option<ExpansionId>,
    ) -> NodeId {
        if op.is_assignment() {
            let access = if op == BinaryOp::Assign {
                PropertyAccess::Set
            } else {
                PropertyAccess::CompoundSet
            };
            self.mark_property_write(lhs, access);
        }

        let lhs_ty = self.value_type(lhs);
        let rhs_ty = self.value_type(rhs);
        let ty = if op.is_assignment() {
            lhs_ty
        } else if op.is_comparison() || op.is_logical() {
            Type::Bool
        } else {
            match op {
                BinaryOp::Sub if lhs_ty.is_pointer() && rhs_ty.is_pointer() => Type::Long,
                BinaryOp::Add | BinaryOp::Sub if lhs_ty.is_pointer() => lhs_ty,
                BinaryOp::Add if rhs_ty.is_pointer() => rhs_ty,
                BinaryOp::Shl | BinaryOp::Shr => promote(&lhs_ty),
                _ => arithmetic_conversion(&lhs_ty, &rhs_ty),
            }
        };

        let range = TextRange::new(
            self.builder.get(lhs).range.start(),
            self.builder.get(rhs).range.end(),
        );
        self.builder
            .node(NodeKind::Binary { op }, range, vec![lhs, rhs], Some(ty), expansion)
    }

    fn mark_property_write(&mut self, target: NodeId, access: PropertyAccess) {
        if let NodeKind::PropertyRef { property, .. } = self.builder.get(target).kind {
            self.builder
                .set_kind(target, NodeKind::PropertyRef { property, access });
        }
    }

    /// Type of the value produced by `id`; property references produce the property type.
    fn value_type(&self, id: NodeId) -> Type {
        let node = self.builder.get(id);
        match (&node.kind, &node.ty) {
            (NodeKind::PropertyRef { property, .. }, _) => {
                self.builder.get_decl(*property).ty.clone()
            }
            (_, Some(ty)) => ty.clone(),
            (_, None) => Type::Int,
        }
    }

    fn unary(&mut self) -> PResult<NodeId> {
        let op = match self.current().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::LNot,
            TokenKind::Tilde => UnaryOp::Not,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Amp => UnaryOp::AddrOf,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            _ => return self.postfix(),
        };
        let mark = self.mark();
        self.bump();
        let operand = self.unary()?;
        Ok(self.unary_node(mark, op, operand))
    }

    fn unary_node(&mut self, mark: Mark, op: UnaryOp, operand: NodeId) -> NodeId {
        if op.is_increment_or_decrement() {
            self.mark_property_write(operand, PropertyAccess::CompoundSet);
        }
        let operand_ty = self.value_type(operand);
        let ty = match op {
            UnaryOp::LNot => Type::Bool,
            UnaryOp::Deref => operand_ty.pointee().cloned().unwrap_or(Type::Int),
            UnaryOp::AddrOf => Type::pointer_to(operand_ty),
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Not => promote(&operand_ty),
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => operand_ty,
        };
        self.finish_node(mark, NodeKind::Unary { op }, vec![operand], Some(ty))
    }

    fn postfix(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let mut expr = self.primary()?;
        loop {
            match self.current().kind {
                TokenKind::LParen => expr = self.call(mark, expr)?,
                TokenKind::Dot | TokenKind::Arrow => expr = self.member_access(mark, expr)?,
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expr()?;
                    self.expect(TokenKind::RBracket, "expected `]`")?;
                    let ty = self
                        .value_type(expr)
                        .pointee()
                        .cloned()
                        .unwrap_or(Type::Int);
                    expr = self.finish_node(mark, NodeKind::Subscript, vec![expr, index], Some(ty));
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.bump().kind == TokenKind::PlusPlus {
                        UnaryOp::PostInc
                    } else {
                        UnaryOp::PostDec
                    };
                    expr = self.unary_node(mark, op, expr);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn call(&mut self, mark: Mark, callee: NodeId) -> PResult<NodeId> {
        let paren = self.mark();
        self.bump();
        let mut children = Vec::new();
        let result_ty = if let Some(&operator) = self.lambda_operators.get(&callee) {
            // Calling a lambda literal goes through its call operator.
            let operator_ty = self.builder.get_decl(operator).ty.clone();
            let result = operator_ty.call_result().cloned().unwrap_or(Type::Void);
            let reference = self.builder.node(
                NodeKind::DeclRef { decl: operator },
                TextRange::empty(paren.start),
                Vec::new(),
                Some(operator_ty),
                paren.expansion,
            );
            children.push(reference);
            children.push(callee);
            result
        } else {
            let callee_ty = self.value_type(callee);
            let Some(result) = callee_ty.call_result().cloned() else {
                return Err(ParseError {
                    message: "called object is not a function".to_string(),
                    range: self.builder.get(callee).range,
                });
            };
            children.push(callee);
            result
        };

        while !self.at(TokenKind::RParen) {
            children.push(self.expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "expected `)` after arguments")?;
        Ok(self.finish_node(mark, NodeKind::Call, children, Some(result_ty)))
    }

    fn member_access(&mut self, mark: Mark, base: NodeId) -> PResult<NodeId> {
        let arrow = self.bump().kind == TokenKind::Arrow;
        let name = self.expect_name()?;
        let base_ty = self.value_type(base);
        let record_ty = if arrow {
            base_ty.pointee().cloned()
        } else {
            Some(base_ty.strip_outer_nullability().clone())
        };
        let member = match &record_ty {
            Some(Type::Record { name: record, .. }) => self
                .records
                .get(record)
                .and_then(|members| members.get(&name.text))
                .copied(),
            _ => None,
        };
        let Some(member) = member else {
            return Err(ParseError {
                message: format!("no member named `{}`", name.text),
                range: name.range,
            });
        };

        let decl = self.builder.get_decl(member);
        let (kind, ty) = match decl.kind {
            DeclKind::Property => (
                NodeKind::PropertyRef {
                    property: member,
                    access: PropertyAccess::Get,
                },
                Type::PseudoObject,
            ),
            _ => (NodeKind::Member { member, arrow }, decl.ty.clone()),
        };
        let range = self.range_from(mark);
        Ok(self
            .builder
            .node(kind, range, vec![base], Some(ty), name.expansion))
    }

    fn primary(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let token = self.current().clone();
        match token.kind {
            TokenKind::IntLiteral => {
                self.bump();
                let ty = if token.text.to_ascii_lowercase().ends_with('l') {
                    Type::Long
                } else {
                    Type::Int
                };
                Ok(self.finish_node(mark, NodeKind::IntegerLiteral, Vec::new(), Some(ty)))
            }
            TokenKind::FloatLiteral => {
                self.bump();
                let ty = if token.text.to_ascii_lowercase().ends_with('f') {
                    Type::Float
                } else {
                    Type::Double
                };
                Ok(self.finish_node(mark, NodeKind::FloatingLiteral, Vec::new(), Some(ty)))
            }
            TokenKind::StringLiteral => {
                self.bump();
                Ok(self.finish_node(mark, NodeKind::StringLiteral, Vec::new(), Some(Type::Str)))
            }
            TokenKind::CharLiteral => {
                self.bump();
                Ok(self.finish_node(mark, NodeKind::CharLiteral, Vec::new(), Some(Type::Char)))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "expected `)`")?;
                let ty = self.builder.get(inner).ty.clone();
                Ok(self.finish_node(mark, NodeKind::Paren, vec![inner], ty))
            }
            TokenKind::LBracket => self.lambda(),
            TokenKind::Ident => self.name_expression(mark, token),
            _ => Err(self.error_here("expected expression")),
        }
    }

    fn name_expression(&mut self, mark: Mark, token: Token) -> PResult<NodeId> {
        match token.text.as_str() {
            "true" | "false" => {
                self.bump();
                return Ok(self.finish_node(mark, NodeKind::BoolLiteral, Vec::new(), Some(Type::Bool)));
            }
            "this" => {
                let Some(record) = self.current_record.clone() else {
                    return Err(self.error_here("`this` outside of a member function"));
                };
                self.bump();
                let ty = Type::pointer_to(self.record_type(&record));
                return Ok(self.finish_node(
                    mark,
                    NodeKind::This { implicit: false },
                    Vec::new(),
                    Some(ty),
                ));
            }
            text if is_keyword(text) => return Err(self.error_here("expected expression")),
            _ => {}
        }

        self.bump();
        let Some(resolution) = self.resolve(&token.text) else {
            return Err(ParseError {
                message: format!("use of undeclared identifier `{}`", token.text),
                range: token.range,
            });
        };

        match resolution {
            Resolution::Local { decl, depth } => {
                self.note_capture(decl, depth, &token)?;
                let ty = self.builder.get_decl(decl).ty.clone();
                Ok(self.finish_node(mark, NodeKind::DeclRef { decl }, Vec::new(), Some(ty)))
            }
            Resolution::Global(decl) => {
                let ty = self.builder.get_decl(decl).ty.clone();
                let is_function = self.builder.get_decl(decl).kind == DeclKind::Function;
                let reference =
                    self.finish_node(mark, NodeKind::DeclRef { decl }, Vec::new(), Some(ty.clone()));
                if !is_function {
                    return Ok(reference);
                }
                Ok(self.finish_node(
                    mark,
                    NodeKind::ImplicitCast {
                        cast: CastKind::FunctionToPointerDecay,
                    },
                    vec![reference],
                    Some(Type::pointer_to(ty)),
                ))
            }
            Resolution::Member(member) => {
                let record = self.current_record.clone().unwrap_or_default();
                let this_ty = Type::pointer_to(self.record_type(&record));
                let this = self.builder.node(
                    NodeKind::This { implicit: true },
                    TextRange::empty(token.range.start()),
                    Vec::new(),
                    Some(this_ty),
                    token.expansion,
                );
                let decl = self.builder.get_decl(member);
                if decl.kind == DeclKind::Property {
                    return Err(ParseError {
                        message: format!("property `{}` requires explicit access", token.text),
                        range: token.range,
                    });
                }
                let ty = decl.ty.clone();
                Ok(self.finish_node(
                    mark,
                    NodeKind::Member {
                        member,
                        arrow: true,
                    },
                    vec![this],
                    Some(ty),
                ))
            }
        }
    }

    fn lambda(&mut self) -> PResult<NodeId> {
        if self.dialect != Dialect::Cxx {
            return Err(self.error_here("lambda expressions require C++"));
        }
        let mark = self.mark();
        self.bump();

        let mut children = Vec::new();
        let mut has_default = false;
        let mut explicit = HashSet::new();
        let mut init_captures = Vec::new();
        while !self.at(TokenKind::RBracket) {
            let capture_mark = self.mark();
            let by_ref = self.at(TokenKind::Amp);
            if (by_ref || self.at(TokenKind::Eq))
                && matches!(self.nth(1).kind, TokenKind::Comma | TokenKind::RBracket)
            {
                self.bump();
                has_default = true;
            } else if self.at_ident("this") {
                self.bump();
            } else {
                if by_ref {
                    self.bump();
                }
                let name = self.expect_name()?;
                if self.eat(TokenKind::Eq) {
                    let init = self.expr()?;
                    let range = self.range_from(capture_mark);
                    let ty = self.value_type(init);
                    let decl = self.builder.decl(Decl {
                        name: name.text.clone(),
                        kind: DeclKind::InitCapture,
                        range,
                        ty,
                    });
                    init_captures.push((name.text.clone(), decl));
                    children.push(self.builder.node(
                        NodeKind::VarDecl {
                            decl,
                            init_capture: true,
                        },
                        range,
                        vec![init],
                        None,
                        capture_mark.expansion,
                    ));
                } else {
                    let Some(Resolution::Local { decl, depth }) = self.resolve(&name.text) else {
                        return Err(ParseError {
                            message: format!("cannot capture `{}`", name.text),
                            range: name.range,
                        });
                    };
                    self.note_capture(decl, depth, &name)?;
                    explicit.insert(decl);
                    children.push(self.finish_node(
                        capture_mark,
                        NodeKind::LambdaCapture { decl },
                        Vec::new(),
                        None,
                    ));
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "expected `]` after lambda captures")?;

        self.push_scope();
        let scope_depth = self.scopes.len() - 1;
        for (name, decl) in &init_captures {
            self.declare(name, *decl);
        }
        self.lambdas.push(LambdaFrame {
            scope_depth,
            has_default,
            explicit,
            implicit: Vec::new(),
        });
        let result = self.lambda_rest(children);
        let implicit_captures = self
            .lambdas
            .pop()
            .map(|frame| frame.implicit)
            .unwrap_or_default();
        self.pop_scope();
        let (children, declared_ret) = result?;

        let ret = match declared_ret {
            Some(ret) => ret,
            None => children
                .last()
                .map(|&body| self.infer_return_type(body))
                .unwrap_or(Type::Void),
        };
        let range = self.range_from(mark);
        let node = self.builder.node(
            NodeKind::Lambda { implicit_captures },
            range,
            children,
            Some(Type::Closure {
                ret: Box::new(ret.clone()),
            }),
            mark.expansion,
        );
        let operator = self.builder.decl(Decl {
            name: "operator()".to_string(),
            kind: DeclKind::LambdaCallOperator,
            range,
            ty: Type::Function { ret: Box::new(ret) },
        });
        self.lambda_operators.insert(node, operator);
        Ok(node)
    }

    /// Everything after the capture list: template parameters, parameters, attributes,
    /// trailing return type, requires clause and body.
    fn lambda_rest(&mut self, mut children: Vec<NodeId>) -> PResult<(Vec<NodeId>, Option<Type>)> {
        if self.eat(TokenKind::Less) {
            loop {
                children.push(self.template_param()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Greater, "expected `>` after template parameters")?;
        }
        if self.at(TokenKind::LParen) {
            children.extend(self.parameters()?);
        }
        children.extend(self.attributes()?);

        let mut declared_ret = None;
        if self.eat(TokenKind::Arrow) {
            let (type_node, ty) = self.parse_type()?;
            children.push(type_node);
            declared_ret = Some(ty);
        }

        if self.at_ident("requires") {
            let mark = self.mark();
            self.bump();
            self.unevaluated += 1;
            let constraint = self.expr_bp(LOGICAL_OR_BP);
            self.unevaluated -= 1;
            let constraint = constraint?;
            children.push(self.finish_node(mark, NodeKind::RequiresClause, vec![constraint], None));
        }

        children.push(self.compound()?);
        Ok((children, declared_ret))
    }

    fn template_param(&mut self) -> PResult<NodeId> {
        let mark = self.mark();
        let mut children = Vec::new();
        let (name, ty, is_type) = if self.at_ident("typename") || self.at_ident("class") {
            self.bump();
            let name = self.expect_name()?;
            if self.eat(TokenKind::Eq) {
                let (default, _) = self.parse_type()?;
                children.push(default);
            }
            let ty = Type::Record {
                name: name.text.clone(),
                elaborated: false,
            };
            self.declare_type(&name.text, ty.clone());
            (name, ty, true)
        } else {
            let (type_node, ty) = self.parse_type()?;
            children.push(type_node);
            let name = self.expect_name()?;
            if self.eat(TokenKind::Eq) {
                // Stop before `>` so it closes the parameter list.
                children.push(self.expr_bp(SHIFT_BP)?);
            }
            (name, ty, false)
        };

        let range = self.range_from(mark);
        let decl = self.builder.decl(Decl {
            name: name.text.clone(),
            kind: DeclKind::TemplateParam,
            range,
            ty,
        });
        if !is_type {
            self.declare(&name.text, decl);
        }
        Ok(self.builder.node(
            NodeKind::TemplateParam { decl },
            range,
            children,
            None,
            mark.expansion,
        ))
    }

    fn infer_return_type(&self, body: NodeId) -> Type {
        let mut stack = vec![body];
        while let Some(id) = stack.pop() {
            let node = self.builder.get(id);
            match &node.kind {
                NodeKind::Lambda { .. } => continue,
                NodeKind::Return => {
                    return node
                        .children
                        .first()
                        .map(|&expr| self.value_type(expr))
                        .unwrap_or(Type::Void);
                }
                _ => stack.extend(node.children.iter().rev().copied()),
            }
        }
        Type::Void
    }
}
