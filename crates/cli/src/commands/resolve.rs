use std::path::Path;

use anyhow::{anyhow, Result};
use pseudoview_core::model::{Address, SymbolKind};
use pseudoview_core::session::ShowOutcome;
use pseudoview_core::tagged::{ColorClass, TextPosition};
use serde::Serialize;

use crate::commands::{open_session, settle};

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub function: String,
    pub line: usize,
    pub column: usize,
    pub word: Option<String>,
    pub color: Option<ColorClass>,
    pub kind: String,
    pub address: Option<Address>,
    /// Why nothing was resolved, when nothing was.
    pub reason: Option<String>,
}

/// Show `function` and report what the cursor at `line`/`column` points at.
pub fn resolve_command(
    root: &str,
    code: &Path,
    decompiler: &str,
    function: &str,
    position: TextPosition,
    json: bool,
) -> Result<()> {
    let mut session = open_session(root, code, decompiler)?;
    match session.show_function(function, false, false) {
        ShowOutcome::Scheduled { .. } => settle(&mut session),
        other => return Err(anyhow!("Cannot show function '{function}': {other:?}")),
    }
    if session.visible().is_none() {
        return Err(anyhow!("No code available for function '{function}'"));
    }

    let report = match session.symbol_at(position) {
        Ok((word, kind)) => ResolveReport {
            function: function.to_string(),
            line: position.line,
            column: position.column,
            word: Some(word.word),
            color: Some(word.color),
            kind: kind.label().to_string(),
            address: kind.address(),
            reason: None,
        },
        Err(err) => ResolveReport {
            function: function.to_string(),
            line: position.line,
            column: position.column,
            word: None,
            color: None,
            kind: SymbolKind::Unclassified.label().to_string(),
            address: None,
            reason: Some(err.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}:{}:{}", report.function, report.line, report.column);
    match (&report.word, report.color) {
        (Some(word), Some(color)) => {
            println!("  Word: {word}");
            println!("  Color: {color:?}");
        }
        _ => println!("  Word: (none)"),
    }
    println!("  Kind: {}", report.kind);
    if let Some(address) = report.address {
        println!("  Address: {address:#x}");
    }
    if let Some(reason) = &report.reason {
        println!("  Reason: {reason}");
    }

    Ok(())
}
