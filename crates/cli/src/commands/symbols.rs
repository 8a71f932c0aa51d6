use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pseudoview_core::config::ProjectLayout;
use pseudoview_core::symbols::SymbolSet;

use crate::canonicalize_or_current;
use crate::commands::open_symbol_db;

/// Load functions and globals from a JSON symbol set into the project database.
pub fn import_symbols_command(root: &str, file: &Path) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let (_config, db_path, db) = open_symbol_db(&layout)?;

    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read symbol file at {}", file.display()))?;
    let set: SymbolSet = serde_json::from_str(&json).context("Failed to parse symbol file JSON")?;

    let (functions, globals) = db.import(&set).context("Failed to import symbols")?;
    tracing::info!(functions, globals, db = %db_path.display(), "imported symbols");

    println!("Imported symbols:");
    println!("  Functions: {functions}");
    println!("  Globals: {globals}");
    println!("  DB: {}", db_path.display());

    Ok(())
}
