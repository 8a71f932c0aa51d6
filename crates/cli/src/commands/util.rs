use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use pseudoview_core::config::{ConfigGenerator, ProjectLayout, ViewerConfig};
use pseudoview_core::db::SymbolDb;
use pseudoview_core::services::decompiler::{Decompiler, DecompilerRegistry, FixtureDecompiler};
use pseudoview_core::Session;

use crate::canonicalize_or_current;

/// How long a command waits for a scheduled redisplay before giving up.
pub const REDISPLAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Load the project config JSON from disk (delegates to core helper).
pub fn load_viewer_config(layout: &ProjectLayout) -> Result<ViewerConfig> {
    pseudoview_core::config::load_viewer_config(layout)
}

/// Resolve the DB path (respecting relative/absolute config) and open a SymbolDb (delegates to core helper).
pub fn open_symbol_db(layout: &ProjectLayout) -> Result<(ViewerConfig, PathBuf, SymbolDb)> {
    pseudoview_core::config::open_symbol_db(layout)
}

/// Pick a decompiler by name from a registry holding the code fixture at `code`.
pub fn select_decompiler(code: &Path, name: &str) -> Result<Arc<dyn Decompiler>> {
    let mut registry = DecompilerRegistry::new();
    registry.register(FixtureDecompiler::load(code)?);
    registry.get(name).ok_or_else(|| {
        anyhow!("Unknown decompiler '{}'. Available: {}", name, registry.names().join(", "))
    })
}

/// Open a session over the project's symbol database and the given code fixture.
///
/// Renames regenerate the snapshot configured in `project.json`, if any.
pub fn open_session(root: &str, code: &Path, decompiler: &str) -> Result<Session> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let (config, _db_path, db) = open_symbol_db(&layout)?;
    let decompiler = select_decompiler(code, decompiler)?;

    let session = Session::new(Box::new(db), decompiler);
    Ok(match config.snapshot_path.as_deref() {
        Some(path) => {
            session.with_config_sink(Box::new(ConfigGenerator::writing_to(layout.resolve(path))))
        }
        None => session,
    })
}

/// Block until the session's latest redisplay has been applied.
pub fn settle(session: &mut Session) {
    if session.redisplay_pending() && session.wait_for_redisplay(REDISPLAY_TIMEOUT).is_none() {
        tracing::debug!("redisplay produced no view");
    }
}

/// Helper to print whether a path exists.
pub fn print_path_status(label: &str, path: &Path) {
    let exists = path.exists();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
