use std::fs;

use anyhow::{Context, Result};
use pseudoview_core::config::{save_viewer_config, ProjectLayout, ViewerConfig};
use pseudoview_core::db::SymbolDb;
use pseudoview_core::symbols::SymbolSource;
use serde::Serialize;

use crate::commands::{load_viewer_config, open_symbol_db, print_path_status};
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Debug, Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub snapshot_path: Option<String>,
    pub functions: usize,
    pub globals: usize,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;

    let mut config = ViewerConfig::new(&project_name, layout.relative_string(&layout.db_path));
    config.snapshot_path = Some(layout.relative_string(&layout.snapshot_path));
    save_viewer_config(&layout, &config)?;

    // Create the symbol database immediately so follow-on commands can rely on it.
    SymbolDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize symbol database at {}", layout.db_path.display())
    })?;

    tracing::info!(name = %project_name, root = %layout.root.display(), "initialized project");
    println!("Initialized pseudoview project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.symbols_db);

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let config = load_viewer_config(&layout)?;
    let (_, db_path, db) = open_symbol_db(&layout)?;

    let info = ProjectInfoSnapshot {
        name: config.name.clone(),
        root: layout.root.display().to_string(),
        config_file: layout.config_path.display().to_string(),
        config_version: config.config_version.clone(),
        db_path: config.symbols_db.clone(),
        snapshot_path: config.snapshot_path.clone(),
        functions: db.functions().len(),
        globals: db.globals().len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("pseudoview Project Info");
    println!("=======================");
    println!("Name: {}", info.name);
    println!("Root: {}", info.root);
    println!("Config file: {}", info.config_file);
    println!("Config version: {}", info.config_version);
    println!("DB path (config): {}", info.db_path);
    println!("Symbols: {} functions, {} globals", info.functions, info.globals);
    println!();
    println!("Files:");
    print_path_status("Symbol DB", &db_path);
    if let Some(snapshot) = &info.snapshot_path {
        print_path_status("Symbol snapshot", &layout.resolve(snapshot));
    }

    Ok(())
}
