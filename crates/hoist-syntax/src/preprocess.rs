//! Object-like macro expansion.
//!
//! Every expansion gets its own [`ExpansionId`]. Expanded tokens are mapped to the file range
//! of the outermost macro name, so node ranges computed from them always point at text that
//! exists in the file.

use std::collections::{HashMap, HashSet};

use text_size::TextSize;

use crate::lexer::{Directive, Lexed, Token, TokenKind};
use crate::tree::ExpansionId;
use crate::{ParseError, TextRange};

#[derive(Debug, Default)]
pub(crate) struct Preprocessor {
    macros: HashMap<String, Vec<Token>>,
    next_expansion: u32,
}

impl Preprocessor {
    pub(crate) fn run(mut self, lexed: Vec<Lexed>, text_len: usize) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        for item in lexed {
            match item {
                Lexed::Directive(directive) => self.directive(directive)?,
                Lexed::Token(token) => {
                    let mut active = HashSet::new();
                    self.expand(token, None, &mut active, &mut out);
                }
            }
        }
        let end = TextSize::from(text_len as u32);
        out.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            range: TextRange::empty(end),
            expansion: None,
        });
        Ok(out)
    }

    fn directive(&mut self, directive: Directive) -> Result<(), ParseError> {
        match directive.name.as_str() {
            "define" => {
                let mut args = directive.args.into_iter();
                let name = match args.next() {
                    Some(token) if token.kind == TokenKind::Ident => token.text,
                    _ => {
                        return Err(ParseError {
                            message: "expected macro name after `#define`".to_string(),
                            range: directive.range,
                        })
                    }
                };
                self.macros.insert(name, args.collect());
            }
            "undef" => {
                if let Some(name) = directive.args.first() {
                    self.macros.remove(&name.text);
                }
            }
            other => {
                tracing::trace!(target = "hoist.syntax", directive = other, "ignoring directive");
            }
        }
        Ok(())
    }

    /// Pushes `token` (or its expansion) onto `out`. `site` is the file range of the
    /// outermost macro name being expanded.
    fn expand(
        &mut self,
        token: Token,
        site: Option<TextRange>,
        active: &mut HashSet<String>,
        out: &mut Vec<Token>,
    ) {
        let body = match token.kind {
            TokenKind::Ident if !active.contains(&token.text) => self.macros.get(&token.text).cloned(),
            _ => None,
        };
        let Some(body) = body else {
            out.push(token);
            return;
        };

        let site = site.unwrap_or(token.range);
        let expansion = ExpansionId::from_raw(self.next_expansion);
        self.next_expansion += 1;

        active.insert(token.text.clone());
        for mut inner in body {
            inner.range = site;
            inner.expansion = Some(expansion);
            self.expand(inner, Some(site), active, out);
        }
        active.remove(&token.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn preprocess(text: &str) -> Vec<Token> {
        Preprocessor::default()
            .run(lex(text).unwrap(), text.len())
            .unwrap()
    }

    #[test]
    fn expanded_tokens_point_at_the_macro_name() {
        let text = "#define SUM 1 + 2\nint x = SUM;";
        let tokens = preprocess(text);
        let sum = text.rfind("SUM").unwrap() as u32;
        let expanded: Vec<_> = tokens.iter().filter(|t| t.expansion.is_some()).collect();
        assert_eq!(expanded.len(), 3);
        for token in expanded {
            assert_eq!(u32::from(token.range.start()), sum);
            assert_eq!(u32::from(token.range.end()), sum + 3);
        }
    }

    #[test]
    fn each_expansion_is_distinct() {
        let tokens = preprocess("#define ONE 1\nint x = ONE + ONE;");
        let ids: Vec<_> = tokens.iter().filter_map(|t| t.expansion).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn self_referential_macros_do_not_loop() {
        let tokens = preprocess("#define x x + 1\nint y = x;");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["int", "y", "=", "x", "+", "1", ";", ""]);
    }
}
