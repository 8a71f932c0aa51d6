//! Core data model for the symbols a pseudocode view talks about.
//!
//! Functions and globals are owned by a [`SymbolSource`](crate::symbols::SymbolSource);
//! the session only keeps addresses and clones of these records.

use serde::{Deserialize, Serialize};

/// Address of a symbol in the analysed binary.
pub type Address = u64;

/// Formal parameter of a function as reported by the decompiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Source-level name recovered from debug info, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), real_name: None }
    }

    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    /// True if `word` is this parameter's name or its non-empty real name.
    pub fn is_named(&self, word: &str) -> bool {
        self.name == word || self.real_name.as_deref().is_some_and(|r| !r.is_empty() && r == word)
    }
}

/// A function known to the symbol source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub address: Address,
    /// False for imports, exports and other thunks that have no body to decompile.
    #[serde(default = "default_true")]
    pub user_defined: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

fn default_true() -> bool {
    true
}

impl Function {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self { name: name.into(), address, user_defined: true, parameters: Vec::new() }
    }

    /// Builder-style helper for imports and other non-decompilable functions.
    pub fn external(name: impl Into<String>, address: Address) -> Self {
        Self { user_defined: false, ..Self::new(name, address) }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn has_parameter(&self, word: &str) -> bool {
        self.parameters.iter().any(|p| p.is_named(word))
    }
}

/// Where a global variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "address")]
pub enum Storage {
    Register,
    Memory(Address),
}

impl Storage {
    pub fn address(self) -> Option<Address> {
        match self {
            Storage::Register => None,
            Storage::Memory(address) => Some(address),
        }
    }
}

/// A global variable known to the symbol source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    pub storage: Storage,
}

impl GlobalVariable {
    pub fn in_memory(name: impl Into<String>, address: Address) -> Self {
        Self { name: name.into(), real_name: None, storage: Storage::Memory(address) }
    }

    pub fn in_register(name: impl Into<String>) -> Self {
        Self { name: name.into(), real_name: None, storage: Storage::Register }
    }

    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    pub fn is_named(&self, word: &str) -> bool {
        self.name == word || self.real_name.as_deref().is_some_and(|r| !r.is_empty() && r == word)
    }
}

/// What a word under the cursor turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SymbolKind {
    Function(Function),
    Global(GlobalVariable),
    /// A parameter of the function currently shown.
    CurrentParameter { name: String },
    Unclassified,
}

impl SymbolKind {
    /// Address a rename or jump should target, if any.
    pub fn address(&self) -> Option<Address> {
        match self {
            SymbolKind::Function(f) => Some(f.address),
            SymbolKind::Global(g) => g.storage.address(),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SymbolKind::Function(_) => "function",
            SymbolKind::Global(_) => "global",
            SymbolKind::CurrentParameter { .. } => "parameter",
            SymbolKind::Unclassified => "unclassified",
        }
    }
}
