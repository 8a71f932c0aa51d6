use crate::model::Address;

/// Append-only log of shown functions plus a cursor into it.
///
/// Entries are never removed, so moving back and forth is O(1) and never
/// re-decompiles anything. While non-empty, `cursor` is a valid index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<Address>,
    cursor: usize,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Address] {
        &self.entries
    }

    /// Cursor index, `None` while the history is empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn current(&self) -> Option<Address> {
        self.entries.get(self.cursor).copied()
    }

    /// Record `function` as shown. Returns false when it was already current
    /// and `force` is not set.
    pub fn push(&mut self, function: Address, force: bool) -> bool {
        if !force && self.current() == Some(function) {
            return false;
        }
        self.entries.push(function);
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Step back one entry and return it, or `None` if already at the start.
    pub fn back(&mut self) -> Option<Address> {
        if self.entries.len() <= 1 || self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward one entry and return it, or `None` if already at the end.
    pub fn forward(&mut self) -> Option<Address> {
        if self.entries.len() <= 1 || self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }
}
