//! Cursor resolution: display columns to raw offsets, and raw offsets to words.

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::tagged::{ColorClass, TaggedText, Token};

/// A cursor in display coordinates: line number and column in the stripped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The token found inside a symmetric span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWord {
    pub word: String,
    pub color: ColorClass,
}

impl TaggedText {
    /// Map a column of the stripped text to the raw offset of the same character.
    ///
    /// Markers and escapes in front of the character are skipped, so the result
    /// always lands on a displayed byte.
    pub fn map_to_raw(&self, plain_column: usize) -> ViewerResult<usize> {
        let mut seen = 0;
        for (token, &offset) in self.tokens().iter().zip(self.offsets()) {
            if let Token::Literal(s) = token {
                if plain_column < seen + s.len() {
                    return Ok(offset + (plain_column - seen));
                }
                seen += s.len();
            }
        }
        Err(ViewerError::NoWordUnderCursor)
    }

    /// Number of displayed bytes strictly before `raw_column`.
    pub fn raw_to_plain(&self, raw_column: usize) -> usize {
        self.tokens()
            .iter()
            .zip(self.offsets())
            .map(|(token, &offset)| match token {
                Token::Literal(s) => s.len().min(raw_column.saturating_sub(offset)),
                _ => 0,
            })
            .sum()
    }

    /// Find the word whose envelope encloses `raw_column`.
    ///
    /// The envelope is the nearest `SpanStart` at or before the cursor paired with
    /// the next span marker after it, which must be a `SpanEnd` at or after the
    /// cursor carrying the same colour. Anything else means there is no word.
    pub fn resolve_word(&self, raw_column: usize) -> Option<ResolvedWord> {
        let tokens = self.tokens();
        let offsets = self.offsets();

        let start = (0..tokens.len())
            .rev()
            .find(|&i| offsets[i] <= raw_column && matches!(tokens[i], Token::SpanStart(_)))?;
        let end = (start + 1..tokens.len())
            .find(|&i| matches!(tokens[i], Token::SpanStart(_) | Token::SpanEnd(_)))?;

        let (Token::SpanStart(open), Token::SpanEnd(close)) = (&tokens[start], &tokens[end]) else {
            return None;
        };
        if open != close {
            return None;
        }
        // A span that closed before the cursor is not the cursor's span.
        if offsets[end] < raw_column {
            return None;
        }

        let word: String = tokens[start + 1..end]
            .iter()
            .filter_map(|t| match t {
                Token::Literal(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        if word.is_empty() {
            return None;
        }
        Some(ResolvedWord { word, color: *open })
    }

    /// Resolve the word under a display-space cursor.
    pub fn word_at(&self, position: TextPosition) -> ViewerResult<ResolvedWord> {
        let line = self.line(position.line).ok_or(ViewerError::NoWordUnderCursor)?;
        let raw = line.map_to_raw(position.column)?;
        line.resolve_word(raw).ok_or(ViewerError::Unclassified)
    }
}
