//! Symbol source abstraction and the in-memory implementation.
//!
//! The viewer never owns the canonical symbol table. It asks a [`SymbolSource`]
//! for functions and globals, and asks it to rename, comment and retype them.
//! [`SymbolTable`] keeps everything in memory; [`crate::db::SymbolDb`] keeps it
//! in SQLite.

pub mod classify;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Address, Function, GlobalVariable, Storage};

pub use classify::classify;

/// Contract the viewer expects from whatever stores symbols.
pub trait SymbolSource: Send {
    fn functions(&self) -> Vec<Function>;

    fn globals(&self) -> Vec<GlobalVariable>;

    fn function_by_name(&self, name: &str) -> Option<Function> {
        self.functions().into_iter().find(|f| f.name == name)
    }

    fn function_at(&self, address: Address) -> Option<Function> {
        self.functions().into_iter().find(|f| f.address == address)
    }

    fn global_by_name_or_real_name(&self, name: &str) -> Option<GlobalVariable> {
        self.globals().into_iter().find(|g| g.is_named(name))
    }

    /// Rename the symbol at `address`. Returns false if the source refused.
    fn set_name(&mut self, address: Address, new_name: &str) -> bool;

    fn function_comment(&self, address: Address) -> Option<String>;

    fn set_function_comment(&mut self, address: Address, comment: &str) -> bool;

    /// One-line declaration of the function at `address`, if the source knows it.
    fn declaration(&self, address: Address) -> Option<String>;

    /// Apply a new declaration. The string is opaque to the viewer.
    fn apply_declaration(&mut self, address: Address, declaration: &str) -> bool;

    /// True if `name` already names a function or a global (by name or real name).
    fn is_name_taken(&self, name: &str) -> bool {
        self.function_by_name(name).is_some() || self.global_by_name_or_real_name(name).is_some()
    }
}

/// Serializable dump of every symbol, used for import and for config snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSet {
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub globals: Vec<GlobalVariable>,
}

/// In-memory symbol source.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    functions: BTreeMap<Address, Function>,
    globals: Vec<GlobalVariable>,
    comments: BTreeMap<Address, String>,
    declarations: BTreeMap<Address, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_set(set: SymbolSet) -> Self {
        let mut table = Self::new();
        for function in set.functions {
            table.add_function(function);
        }
        for global in set.globals {
            table.add_global(global);
        }
        table
    }

    pub fn add_function(&mut self, function: Function) -> &mut Self {
        self.functions.insert(function.address, function);
        self
    }

    pub fn add_global(&mut self, global: GlobalVariable) -> &mut Self {
        self.globals.push(global);
        self
    }

    pub fn set_declaration(&mut self, address: Address, declaration: impl Into<String>) -> &mut Self {
        self.declarations.insert(address, declaration.into());
        self
    }
}

impl SymbolSource for SymbolTable {
    fn functions(&self) -> Vec<Function> {
        self.functions.values().cloned().collect()
    }

    fn globals(&self) -> Vec<GlobalVariable> {
        self.globals.clone()
    }

    fn function_at(&self, address: Address) -> Option<Function> {
        self.functions.get(&address).cloned()
    }

    fn set_name(&mut self, address: Address, new_name: &str) -> bool {
        if let Some(function) = self.functions.get_mut(&address) {
            function.name = new_name.to_string();
            return true;
        }
        match self.globals.iter_mut().find(|g| g.storage == Storage::Memory(address)) {
            Some(global) => {
                global.name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    fn function_comment(&self, address: Address) -> Option<String> {
        self.comments.get(&address).cloned()
    }

    fn set_function_comment(&mut self, address: Address, comment: &str) -> bool {
        if !self.functions.contains_key(&address) {
            return false;
        }
        if comment.is_empty() {
            self.comments.remove(&address);
        } else {
            self.comments.insert(address, comment.to_string());
        }
        true
    }

    fn declaration(&self, address: Address) -> Option<String> {
        self.declarations.get(&address).cloned()
    }

    fn apply_declaration(&mut self, address: Address, declaration: &str) -> bool {
        if !self.functions.contains_key(&address) || declaration.trim().is_empty() {
            return false;
        }
        self.declarations.insert(address, declaration.to_string());
        true
    }
}
