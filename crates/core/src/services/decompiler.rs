use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Address, Function};
use crate::tagged::TaggedText;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecompileError {
    #[error("No code available for {name} at {address:#x}")]
    NoCode { name: String, address: Address },
    #[error("Decompiler error: {0}")]
    Backend(String),
}

/// Trait implemented by decompilers that produce tagged pseudocode.
///
/// Called from worker threads, hence `Send + Sync`.
pub trait Decompiler: Send + Sync {
    fn decompile(&self, function: &Function) -> Result<TaggedText, DecompileError>;
    fn name(&self) -> &'static str;
}

/// Registry for decompilers; callers select by name.
#[derive(Default)]
pub struct DecompilerRegistry {
    decompilers: HashMap<String, Arc<dyn Decompiler>>,
}

impl DecompilerRegistry {
    pub fn new() -> Self {
        Self { decompilers: HashMap::new() }
    }

    pub fn register<D: Decompiler + 'static>(&mut self, decompiler: D) -> &mut Self {
        self.decompilers.insert(decompiler.name().to_string(), Arc::new(decompiler));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Decompiler>> {
        self.decompilers.get(name).cloned()
    }

    /// Return a sorted list of registered decompiler names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.decompilers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// One pre-recorded function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub address: Address,
    pub code: TaggedText,
}

/// Decompiler that serves pre-recorded tagged text keyed by function address.
///
/// Useful for replaying captured sessions and for tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureDecompiler {
    code: BTreeMap<Address, TaggedText>,
}

impl FixtureDecompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, address: Address, code: impl Into<TaggedText>) -> Self {
        self.code.insert(address, code.into());
        self
    }

    pub fn from_entries(entries: Vec<CodeEntry>) -> Self {
        Self { code: entries.into_iter().map(|e| (e.address, e.code)).collect() }
    }

    /// Load a JSON array of [`CodeEntry`] from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read code fixture at {}", path.display()))?;
        let entries: Vec<CodeEntry> =
            serde_json::from_str(&json).context("Failed to parse code fixture JSON")?;
        Ok(Self::from_entries(entries))
    }
}

impl Decompiler for FixtureDecompiler {
    fn decompile(&self, function: &Function) -> Result<TaggedText, DecompileError> {
        self.code.get(&function.address).cloned().ok_or_else(|| DecompileError::NoCode {
            name: function.name.clone(),
            address: function.address,
        })
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
