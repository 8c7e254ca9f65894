//! Trace manifest parser.
//!
//! ```text
//! ClaimAssembly("App")
//! ClaimType("App", "App.Main"); ClaimMethod("App", "App.Main", "Void Run()")
//! // comments and blank lines are ignored
//! ```

use std::ops::Range;

use super::lexer::{Token, TokenKind, lex, token_text, unescape};
use crate::{Error, ManifestLocation, SourceId, SourceMap, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Assembly(String),
    Type {
        assembly: String,
        ty: String,
    },
    Method {
        assembly: String,
        ty: String,
        method: String,
    },
}

/// One claim with the place it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub claim: Claim,
    pub line: usize,
    pub span: Span,
}

impl Directive {
    pub fn location(&self, manifest: &str) -> ManifestLocation {
        ManifestLocation {
            manifest: manifest.to_owned(),
            line: self.line,
            span: self.span.clone(),
        }
    }
}

/// Directive names and their argument counts.
const DIRECTIVES: [(&str, usize); 3] = [
    ("ClaimAssembly", 1),
    ("ClaimType", 2),
    ("ClaimMethod", 3),
];

/// Parse every directive of a registered manifest. Any malformed statement aborts.
pub fn parse_manifest(sources: &SourceMap, id: SourceId) -> Result<Vec<Directive>, Error> {
    let Some(source) = sources.get(id) else {
        return Err(Error::Internal(format!("manifest source {id:?} is not registered")));
    };

    let tokens: Vec<Token> = lex(&source.text)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect();

    let mut parser = Parser {
        sources,
        id,
        name: &source.name,
        text: &source.text,
        tokens,
        pos: 0,
    };
    parser.manifest()
}

struct Parser<'a> {
    sources: &'a SourceMap,
    id: SourceId,
    name: &'a str,
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn manifest(&mut self) -> Result<Vec<Directive>, Error> {
        let mut directives = Vec::new();
        while let Some(token) = self.peek() {
            if is_terminator(token.kind) {
                self.pos += 1;
                continue;
            }
            directives.push(self.directive()?);
            match self.peek() {
                None => {}
                Some(t) if is_terminator(t.kind) => self.pos += 1,
                Some(t) => {
                    let message = format!("unexpected `{}` after directive", self.text_of(t));
                    return Err(self.error(&t.span, message));
                }
            }
        }
        Ok(directives)
    }

    fn directive(&mut self) -> Result<Directive, Error> {
        let head = self.bump_cloned();
        if head.kind != TokenKind::Ident {
            return Err(self.error(
                &head.span,
                format!("expected a directive, found `{}`", self.text_of(&head)),
            ));
        }

        let name = self.text_of(&head);
        let Some(&(_, arity)) = DIRECTIVES.iter().find(|(d, _)| *d == name) else {
            return Err(self.error(
                &head.span,
                format!(
                    "unknown directive `{name}`; expected ClaimAssembly, ClaimType or ClaimMethod"
                ),
            ));
        };

        match self.peek() {
            Some(t) if t.kind == TokenKind::ParenOpen => self.pos += 1,
            _ => {
                let span = self.peek().map_or(head.span.clone(), |t| t.span.clone());
                return Err(self.error(&span, format!("expected `(` after `{name}`")));
            }
        }

        let mut args = Vec::new();
        let close = loop {
            let Some(token) = self.peek().cloned() else {
                return Err(self.error(&head.span, format!("unclosed `(` in `{name}`")));
            };
            match token.kind {
                TokenKind::ParenClose if args.is_empty() => {
                    self.pos += 1;
                    break token;
                }
                TokenKind::Str => {
                    self.pos += 1;
                    let value = unescape(self.text_of(&token))
                        .map_err(|reason| self.error(&token.span, reason))?;
                    args.push(value);
                }
                _ => {
                    let message = "expected a string argument".to_string();
                    return Err(self.error(&token.span, message));
                }
            }

            let Some(next) = self.peek().cloned() else {
                return Err(self.error(&head.span, format!("unclosed `(` in `{name}`")));
            };
            match next.kind {
                TokenKind::Comma => self.pos += 1,
                TokenKind::ParenClose => {
                    self.pos += 1;
                    break next;
                }
                _ => return Err(self.error(&next.span, "expected `,` or `)`".to_string())),
            }
        };

        let span = head.span.start..close.span.end;
        if args.len() != arity {
            return Err(self.error(
                &span,
                format!("`{name}` takes {arity} argument(s), found {}", args.len()),
            ));
        }

        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();
        let claim = match arity {
            1 => Claim::Assembly(next()),
            2 => Claim::Type {
                assembly: next(),
                ty: next(),
            },
            _ => Claim::Method {
                assembly: next(),
                ty: next(),
                method: next(),
            },
        };

        Ok(Directive {
            claim,
            line: self.sources.line_of(self.id, span.start),
            span: Span::new(self.id, span),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump_cloned(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn text_of(&self, token: &Token) -> &'a str {
        token_text(self.text, token)
    }

    fn error(&self, range: &Range<usize>, message: String) -> Error {
        Error::ManifestSyntax {
            at: ManifestLocation {
                manifest: self.name.to_owned(),
                line: self.sources.line_of(self.id, range.start),
                span: Span::new(self.id, range.clone()),
            },
            message,
        }
    }
}

fn is_terminator(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Newline | TokenKind::Semicolon)
}
