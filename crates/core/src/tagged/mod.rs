//! Tagged pseudocode text.
//!
//! Decompiler output arrives as a string with colour markup interleaved:
//! - `COLOR_ON c` opens a span of colour `c`,
//! - `COLOR_OFF c` closes it,
//! - `COLOR_ESC` quotes the next character so it is displayed literally,
//! - `COLOR_INV` toggles inverse video and displays nothing.
//!
//! [`TaggedText`] tokenizes the raw string once. Cursor resolution
//! ([`resolve`]) and rename substitution both work on the token stream rather
//! than on raw byte offsets.

pub mod resolve;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use resolve::{ResolvedWord, TextPosition};

pub const COLOR_ON: u8 = 0x01;
pub const COLOR_OFF: u8 = 0x02;
pub const COLOR_ESC: u8 = 0x03;
pub const COLOR_INV: u8 = 0x04;

/// Colour attached to a markup span.
///
/// Only the classes the viewer reacts to get their own variant; everything
/// else is carried through as the raw colour byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    /// Plain names: functions and globals.
    Default,
    /// Data references: locals and parameters.
    Identifier,
    ImportName,
    Other(u8),
}

impl ColorClass {
    pub const DEFAULT_BYTE: u8 = 0x01;
    pub const IDENTIFIER_BYTE: u8 = 0x0F;
    pub const IMPORT_NAME_BYTE: u8 = 0x22;

    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            Self::DEFAULT_BYTE => ColorClass::Default,
            Self::IDENTIFIER_BYTE => ColorClass::Identifier,
            Self::IMPORT_NAME_BYTE => ColorClass::ImportName,
            other => ColorClass::Other(other),
        }
    }

    pub const fn byte(self) -> u8 {
        match self {
            ColorClass::Default => Self::DEFAULT_BYTE,
            ColorClass::Identifier => Self::IDENTIFIER_BYTE,
            ColorClass::ImportName => Self::IMPORT_NAME_BYTE,
            ColorClass::Other(b) => b,
        }
    }
}

/// One element of a tokenized tagged string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    SpanStart(ColorClass),
    SpanEnd(ColorClass),
    /// A single non-printing control byte (`COLOR_ESC`, `COLOR_INV`, or a
    /// marker truncated before its colour byte).
    Escape(u8),
}

impl Token {
    /// Number of bytes this token occupies in the raw string.
    pub fn raw_len(&self) -> usize {
        match self {
            Token::Literal(s) => s.len(),
            Token::SpanStart(_) | Token::SpanEnd(_) => 2,
            Token::Escape(_) => 1,
        }
    }

    /// Number of bytes this token contributes to the displayed text.
    pub fn plain_len(&self) -> usize {
        match self {
            Token::Literal(s) => s.len(),
            _ => 0,
        }
    }

    fn write_raw(&self, out: &mut String) {
        match self {
            Token::Literal(s) => out.push_str(s),
            Token::SpanStart(c) => {
                out.push(char::from(COLOR_ON));
                out.push(char::from(c.byte()));
            }
            Token::SpanEnd(c) => {
                out.push(char::from(COLOR_OFF));
                out.push(char::from(c.byte()));
            }
            Token::Escape(b) => out.push(char::from(*b)),
        }
    }
}

/// Build the raw markup for `word` wrapped in a span of `color`.
pub fn envelope(color: ColorClass, word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    Token::SpanStart(color).write_raw(&mut out);
    out.push_str(word);
    Token::SpanEnd(color).write_raw(&mut out);
    out
}

/// Decompiled code for one function, with markup.
#[derive(Clone, PartialEq, Eq)]
pub struct TaggedText {
    raw: String,
    tokens: Vec<Token>,
    /// Raw byte offset at which each token starts.
    offsets: Vec<usize>,
}

impl TaggedText {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let tokens = tokenize(&raw);
        let offsets = token_offsets(&tokens);
        Self { raw, tokens, offsets }
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut raw = String::new();
        for token in &tokens {
            token.write_raw(&mut raw);
        }
        let offsets = token_offsets(&tokens);
        Self { raw, tokens, offsets }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The displayed text with every markup byte stripped.
    pub fn plain(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for token in &self.tokens {
            if let Token::Literal(s) = token {
                out.push_str(s);
            }
        }
        out
    }

    pub fn plain_len(&self) -> usize {
        self.tokens.iter().map(Token::plain_len).sum()
    }

    /// Line `index` (0-based) as its own tagged text.
    ///
    /// Lines break only at newlines in displayed text. A `\n` used as a span's
    /// colour byte is part of the marker.
    pub fn line(&self, index: usize) -> Option<TaggedText> {
        self.split_lines().into_iter().nth(index).map(TaggedText::from_tokens)
    }

    pub fn line_count(&self) -> usize {
        1 + self
            .tokens
            .iter()
            .map(|token| match token {
                Token::Literal(s) => s.matches('\n').count(),
                _ => 0,
            })
            .sum::<usize>()
    }

    fn split_lines(&self) -> Vec<Vec<Token>> {
        let mut lines = Vec::new();
        let mut current = Vec::new();
        for token in &self.tokens {
            let Token::Literal(s) = token else {
                current.push(token.clone());
                continue;
            };
            let mut parts = s.split('\n');
            if let Some(first) = parts.next().filter(|part| !part.is_empty()) {
                current.push(Token::Literal(first.to_string()));
            }
            for part in parts {
                lines.push(std::mem::take(&mut current));
                if !part.is_empty() {
                    current.push(Token::Literal(part.to_string()));
                }
            }
        }
        lines.push(current);
        lines
    }

    /// Whether `word` appears wrapped in a span of exactly `color`.
    pub fn contains_envelope(&self, color: ColorClass, word: &str) -> bool {
        self.envelope_positions(color, word).next().is_some()
    }

    /// Replace every `color` envelope around exactly `from` with one around `to`.
    ///
    /// Returns `None` when nothing matched, so callers can leave the original
    /// bytes untouched.
    pub fn replace_envelope(&self, color: ColorClass, from: &str, to: &str) -> Option<TaggedText> {
        let positions: Vec<usize> = self.envelope_positions(color, from).collect();
        if positions.is_empty() {
            return None;
        }
        let mut tokens = self.tokens.clone();
        for i in positions {
            tokens[i + 1] = Token::Literal(to.to_string());
        }
        Some(TaggedText::from_tokens(tokens))
    }

    /// Index of each `SpanStart` that opens a `color` envelope around exactly `word`.
    fn envelope_positions<'a>(
        &'a self,
        color: ColorClass,
        word: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        self.tokens.windows(3).enumerate().filter_map(move |(i, w)| match w {
            [Token::SpanStart(open), Token::Literal(text), Token::SpanEnd(close)]
                if *open == color && *close == color && text == word =>
            {
                Some(i)
            }
            _ => None,
        })
    }
}

impl fmt::Debug for TaggedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedText").field("raw", &self.raw).finish()
    }
}

impl From<&str> for TaggedText {
    fn from(raw: &str) -> Self {
        TaggedText::parse(raw)
    }
}

impl From<String> for TaggedText {
    fn from(raw: String) -> Self {
        TaggedText::parse(raw)
    }
}

impl Serialize for TaggedText {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TaggedText {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TaggedText::parse)
    }
}

fn token_offsets(tokens: &[Token]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(tokens.len());
    let mut at = 0;
    for token in tokens {
        offsets.push(at);
        at += token.raw_len();
    }
    offsets
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.chars().peekable();

    let flush = |literal: &mut String, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    };

    while let Some(c) = chars.next() {
        let Ok(byte) = u8::try_from(c) else {
            literal.push(c);
            continue;
        };
        match byte {
            COLOR_ON | COLOR_OFF => {
                flush(&mut literal, &mut tokens);
                // Colour bytes are single ASCII bytes; anything else means the
                // marker was cut short and only the marker byte is consumed.
                match chars.peek().copied().filter(char::is_ascii) {
                    Some(color) => {
                        chars.next();
                        let color = ColorClass::from_byte(color as u8);
                        tokens.push(if byte == COLOR_ON {
                            Token::SpanStart(color)
                        } else {
                            Token::SpanEnd(color)
                        });
                    }
                    None => tokens.push(Token::Escape(byte)),
                }
            }
            COLOR_ESC => {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::Escape(byte));
                if let Some(quoted) = chars.next() {
                    literal.push(quoted);
                }
            }
            COLOR_INV => {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::Escape(byte));
            }
            _ => literal.push(c),
        }
    }
    flush(&mut literal, &mut tokens);
    tokens
}
