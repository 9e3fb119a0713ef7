//! Explicit read position over an event's word sequence

use crate::error::DecodeError;
use crate::felt::Felt;

/// Read cursor over a slice of words
///
/// Every decode step takes the cursor by `&mut` so the number of words it consumed is visible
/// at the call site through [`FeltCursor::position`].
#[derive(Debug, Clone)]
pub struct FeltCursor<'a> {
    words: &'a [Felt],
    position: usize,
}

impl<'a> FeltCursor<'a> {
    pub fn new(words: &'a [Felt]) -> Self {
        Self::at(words, 0)
    }

    /// Start reading at `position`
    pub fn at(words: &'a [Felt], position: usize) -> Self {
        Self { words, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Words not yet consumed
    pub fn remaining(&self) -> usize {
        self.words.len().saturating_sub(self.position)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the word `offset` positions ahead without consuming it
    pub fn peek(&self, offset: usize) -> Option<Felt> {
        self.words.get(self.position.checked_add(offset)?).copied()
    }

    /// Consume one word; `field` names the value being read for the error message
    pub fn next(&mut self, field: &str) -> Result<Felt, DecodeError> {
        let word = self.words.get(self.position).copied().ok_or_else(|| {
            DecodeError::Truncated {
                field: field.to_string(),
                offset: self.position,
                len: self.words.len(),
            }
        })?;
        self.position += 1;
        Ok(word)
    }

    /// Move forward without reading
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// The unread tail
    pub fn rest(&self) -> &'a [Felt] {
        self.words.get(self.position..).unwrap_or(&[])
    }
}
