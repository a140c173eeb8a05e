//! Tokenizer for the fixture front-end.
//!
//! Preprocessor lines are returned as [`Directive`]s and handled by
//! [`crate::preprocess`]; everything else becomes a flat token stream.

use text_size::TextSize;

use crate::tree::ExpansionId;
use crate::{ParseError, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Question,
    Dot,
    Arrow,
    At,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    EqEq,
    BangEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Shl,
    Shr,
    PlusPlus,
    MinusMinus,

    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,

    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// File range of the token. Tokens produced by a macro expansion carry the range of
    /// the macro name at the expansion site.
    pub range: TextRange,
    pub expansion: Option<ExpansionId>,
}

impl Token {
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }
}

/// A `#...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub args: Vec<Token>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexed {
    Token(Token),
    Directive(Directive),
}

pub fn lex(text: &str) -> Result<Vec<Lexed>, ParseError> {
    Lexer::new(text).run()
}

const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    ("->", TokenKind::Arrow),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LessEq),
    (">=", TokenKind::GreaterEq),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("?", TokenKind::Question),
    (".", TokenKind::Dot),
    ("@", TokenKind::At),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    ("=", TokenKind::Eq),
];

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Whether only whitespace has been seen since the last newline.
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            at_line_start: true,
        }
    }

    fn run(mut self) -> Result<Vec<Lexed>, ParseError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia(true)?;
            if self.pos >= self.bytes.len() {
                break;
            }
            if self.at_line_start && self.bytes[self.pos] == b'#' {
                out.push(Lexed::Directive(self.directive()?));
                continue;
            }
            self.at_line_start = false;
            out.push(Lexed::Token(self.token()?));
        }
        Ok(out)
    }

    fn range(&self, start: usize) -> TextRange {
        TextRange::new(TextSize::from(start as u32), TextSize::from(self.pos as u32))
    }

    fn error(&self, message: impl Into<String>, start: usize) -> ParseError {
        let end = (start + 1).min(self.bytes.len()).max(start);
        ParseError {
            message: message.into(),
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
        }
    }

    /// Skips whitespace and comments. Newlines are only crossed when `cross_lines` is set.
    fn skip_trivia(&mut self, cross_lines: bool) -> Result<(), ParseError> {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => {
                    if !cross_lines {
                        return Ok(());
                    }
                    self.at_line_start = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\\' if self.bytes.get(self.pos + 1) == Some(&b'\n') => self.pos += 2,
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.pos + 1 >= self.bytes.len() {
                            return Err(self.error("unterminated block comment", start));
                        }
                        if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                            self.pos += 2;
                            break;
                        }
                        if self.bytes[self.pos] == b'\n' && cross_lines {
                            self.at_line_start = true;
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    fn directive(&mut self) -> Result<Directive, ParseError> {
        let start = self.pos;
        self.pos += 1;
        self.skip_trivia(false)?;
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name = self.text[name_start..self.pos].to_string();
        if name.is_empty() {
            return Err(self.error("expected preprocessor directive name", start));
        }

        let mut args = Vec::new();
        loop {
            self.skip_trivia(false)?;
            if self.pos >= self.bytes.len() || self.bytes[self.pos] == b'\n' {
                break;
            }
            args.push(self.token()?);
        }
        Ok(Directive {
            name,
            args,
            range: self.range(start),
        })
    }

    fn token(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let b = self.bytes[start];
        let kind = if is_ident_start(b) {
            while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
                self.pos += 1;
            }
            TokenKind::Ident
        } else if b.is_ascii_digit()
            || (b == b'.' && self.bytes.get(start + 1).is_some_and(u8::is_ascii_digit))
        {
            self.number()
        } else if b == b'"' || b == b'\'' {
            self.quoted(b)?
        } else {
            let rest = &self.text[start..];
            let Some((punct, kind)) = PUNCTUATION
                .iter()
                .find(|(punct, _)| rest.starts_with(punct))
            else {
                let ch = rest.chars().next().unwrap_or('\0');
                return Err(self.error(format!("unexpected character `{ch}`"), start));
            };
            self.pos += punct.len();
            *kind
        };

        Ok(Token {
            kind,
            text: self.text[start..self.pos].to_string(),
            range: self.range(start),
            expansion: None,
        })
    }

    fn number(&mut self) -> TokenKind {
        let mut kind = TokenKind::IntLiteral;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && kind == TokenKind::IntLiteral {
                kind = TokenKind::FloatLiteral;
                self.pos += 1;
            } else if b.is_ascii_alphabetic() {
                // Suffixes (`u`, `l`, `f`) and hex digits.
                if matches!(b, b'f' | b'F') && kind == TokenKind::FloatLiteral {
                    self.pos += 1;
                    break;
                }
                self.pos += 1;
            } else {
                break;
            }
        }
        kind
    }

    fn quoted(&mut self, quote: u8) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                b if b == quote => {
                    self.pos += 1;
                    return Ok(if quote == b'"' {
                        TokenKind::StringLiteral
                    } else {
                        TokenKind::CharLiteral
                    });
                }
                _ => self.pos += 1,
            }
        }
        Err(self.error("unterminated literal", start))
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
