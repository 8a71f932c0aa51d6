//! Project configuration, on-disk layout and symbol snapshot regeneration.
//!
//! - `ViewerConfig`: serializable project metadata (`.pseudoview/project.json`).
//! - `ProjectLayout`: computed paths for project files; performs no IO.
//! - `ConfigSink`: the collaborator notified after a successful rename.
//! - `ConfigGenerator`: JSON snapshot of every symbol, optionally written to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::SymbolDb;
use crate::symbols::{SymbolSet, SymbolSource};

/// Serializable configuration describing a viewer project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Schema/config version. This is about the config format.
    pub config_version: String,
    /// Path to the symbol database (typically relative to project root).
    pub symbols_db: String,
    /// Where regenerated symbol snapshots are written, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
}

impl ViewerConfig {
    pub fn new(name: impl Into<String>, symbols_db: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_version: "0.1.0".to_string(),
            symbols_db: symbols_db.into(),
            snapshot_path: None,
        }
    }
}

/// Logical layout of a project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory for internal metadata (.pseudoview).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub config_path: PathBuf,
    /// Default path of the symbol database.
    pub db_path: PathBuf,
    /// Default path of the regenerated symbol snapshot.
    pub snapshot_path: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".pseudoview");
        let config_path = meta_dir.join("project.json");
        let db_path = meta_dir.join("symbols.db");
        let snapshot_path = meta_dir.join("symbols.snapshot.json");
        Self { root, meta_dir, config_path, db_path, snapshot_path }
    }

    /// Path of `path` relative to the root when possible, for storing in config.
    pub fn relative_string(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }

    /// Resolve a config path against the root unless it is absolute.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Load the project config JSON from disk for a given layout.
pub fn load_viewer_config(layout: &ProjectLayout) -> Result<ViewerConfig> {
    let json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read project config at {}", layout.config_path.display())
    })?;
    serde_json::from_str(&json).context("Failed to parse project config JSON")
}

/// Write the project config JSON, creating the metadata directory if needed.
pub fn save_viewer_config(layout: &ProjectLayout, config: &ViewerConfig) -> Result<()> {
    std::fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.config_path.display())
    })
}

/// Load the config and open the symbol database it points at.
pub fn open_symbol_db(layout: &ProjectLayout) -> Result<(ViewerConfig, PathBuf, SymbolDb)> {
    let config = load_viewer_config(layout)?;
    let db_path = layout.resolve(&config.symbols_db);
    let db = SymbolDb::open(&db_path)
        .with_context(|| format!("Failed to open symbol database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

/// Collaborator told to regenerate persisted configuration after a rename.
pub trait ConfigSink: Send {
    /// Produce (and persist, if the sink does that) a serialized snapshot.
    fn regenerate(&mut self, symbols: &dyn SymbolSource) -> Result<String>;
}

/// Snapshot of every symbol, stamped with the time it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub generated_at: String,
    #[serde(flatten)]
    pub symbols: SymbolSet,
}

/// Serializes all symbols to JSON, optionally writing the result to a file.
#[derive(Debug, Clone, Default)]
pub struct ConfigGenerator {
    output: Option<PathBuf>,
}

impl ConfigGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writing_to(path: impl Into<PathBuf>) -> Self {
        Self { output: Some(path.into()) }
    }

    pub fn snapshot(symbols: &dyn SymbolSource) -> SymbolSnapshot {
        SymbolSnapshot {
            generated_at: Utc::now().to_rfc3339(),
            symbols: SymbolSet { functions: symbols.functions(), globals: symbols.globals() },
        }
    }
}

impl ConfigSink for ConfigGenerator {
    fn regenerate(&mut self, symbols: &dyn SymbolSource) -> Result<String> {
        let json = serde_json::to_string_pretty(&Self::snapshot(symbols))?;
        if let Some(path) = &self.output {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write symbol snapshot: {}", path.display()))?;
        }
        Ok(json)
    }
}
