//! Regex driven tokenizer shared by both expression parsers.
//!
//! Tokenizing happens in two passes. [`normalize`] first rewrites implicit
//! multiplication (`2(3)`, `(1)(2)`, `3x`) into explicit `*` operators, then the
//! normalized text is matched against an ordered list of anchored patterns.

use crate::error::ExpressionError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// The kinds of tokens an expression is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Number,
    Ident,
    Equals,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    LParen,
    RParen,
}

impl TokenKind {
    /// The upper-case kind name, e.g. `NUMBER` or `LPAREN`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "IDENT",
            TokenKind::Equals => "EQUALS",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::Power => "POWER",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
        }
    }
}

/// Displays the kind the way it appears in grammar productions: `NUMBER`, `VAR` or the
/// operator itself.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "VAR",
            TokenKind::Equals => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Power => "**",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// `NUMBER(5)` and `IDENT(x)` carry their text, operators print their kind name only.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number | TokenKind::Ident => write!(f, "{}({})", self.kind.name(), self.text),
            kind => f.write_str(kind.name()),
        }
    }
}

lazy_static! {
    // Applied in order. `\b` keeps digits inside identifiers (`x1y`) intact.
    static ref IMPLICIT_MULTIPLICATION: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"([0-9])\s*\(").unwrap(), "${1}*("),
        (Regex::new(r"\)\s*([0-9])").unwrap(), ")*${1}"),
        (Regex::new(r"\)\s*\(").unwrap(), ")*("),
        (Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)\s*([a-zA-Z_])").unwrap(), "${1}*${2}"),
        (Regex::new(r"([a-zA-Z_0-9])\s*\(").unwrap(), "${1}*("),
    ];

    // Order matters: `**` must be tried before `*`. `None` marks skipped whitespace.
    static ref PATTERNS: Vec<(Option<TokenKind>, Regex)> = vec![
        (Some(TokenKind::Number), Regex::new(r"^[0-9]+(\.[0-9]+)?").unwrap()),
        (Some(TokenKind::Ident), Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap()),
        (Some(TokenKind::Equals), Regex::new(r"^=").unwrap()),
        (Some(TokenKind::Power), Regex::new(r"^(\*\*|\^)").unwrap()),
        (Some(TokenKind::Percent), Regex::new(r"^%").unwrap()),
        (Some(TokenKind::Plus), Regex::new(r"^\+").unwrap()),
        (Some(TokenKind::Minus), Regex::new(r"^-").unwrap()),
        (Some(TokenKind::Star), Regex::new(r"^\*").unwrap()),
        (Some(TokenKind::Slash), Regex::new(r"^/").unwrap()),
        (Some(TokenKind::LParen), Regex::new(r"^\(").unwrap()),
        (Some(TokenKind::RParen), Regex::new(r"^\)").unwrap()),
        (None, Regex::new(r"^\s+").unwrap()),
    ];
}

/// Rewrites implicit multiplication into explicit `*` operators.
///
/// ```
/// assert_eq!(formlang::lexer::normalize("7(3)"), "7*(3)");
/// assert_eq!(formlang::lexer::normalize("(1) (2)"), "(1)*(2)");
/// ```
pub fn normalize(text: &str) -> String {
    IMPLICIT_MULTIPLICATION
        .iter()
        .fold(text.to_string(), |acc, (regex, replacement)| {
            regex.replace_all(&acc, *replacement).into_owned()
        })
}

/// Splits `text` into tokens.
///
/// Fails on the first character no pattern matches. The reported position is the
/// character index into the normalized text.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ExpressionError> {
    let normalized = normalize(text);
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < normalized.len() {
        let rest = &normalized[offset..];

        let Some((kind, matched)) = PATTERNS
            .iter()
            .find_map(|(kind, regex)| regex.find(rest).map(|m| (*kind, m.as_str())))
        else {
            let character = rest.chars().next().unwrap_or_default();
            let position = normalized[..offset].chars().count();
            return Err(ExpressionError::Lexical {
                character,
                position,
            });
        };

        if let Some(kind) = kind {
            tokens.push(Token::new(kind, matched));
        }
        offset += matched.len();
    }

    log::trace!("tokenized {text:?} into {} tokens", tokens.len());

    Ok(tokens)
}
