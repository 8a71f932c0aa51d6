use std::collections::BTreeMap;

use crate::model::Address;
use crate::tagged::{ColorClass, TaggedText};

/// Decompiled code per function, keyed by function address.
///
/// Entries are replaced wholesale, never merged.
#[derive(Debug, Clone, Default)]
pub struct DecompiledCache {
    entries: BTreeMap<Address, TaggedText>,
}

impl DecompiledCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` for `function`, returning the entry it replaced.
    pub fn put(&mut self, function: Address, text: TaggedText) -> Option<TaggedText> {
        self.entries.insert(function, text)
    }

    pub fn get(&self, function: Address) -> Option<&TaggedText> {
        self.entries.get(&function)
    }

    pub fn contains(&self, function: Address) -> bool {
        self.entries.contains_key(&function)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Address, &TaggedText)> {
        self.entries.iter().map(|(address, text)| (*address, text))
    }

    /// Rewrite every `color` envelope around `from` into one around `to`, in
    /// every entry. Entries without a match keep their exact bytes.
    ///
    /// Returns how many entries changed.
    pub fn rewrite_envelopes(&mut self, color: ColorClass, from: &str, to: &str) -> usize {
        let mut rewritten = 0;
        for text in self.entries.values_mut() {
            if let Some(updated) = text.replace_envelope(color, from, to) {
                *text = updated;
                rewritten += 1;
            }
        }
        rewritten
    }
}
