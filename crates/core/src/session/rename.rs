use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::model::Address;
use crate::session::cache::DecompiledCache;
use crate::symbols::SymbolSource;
use crate::tagged::{ColorClass, TaggedText};

/// What kind of symbol is being renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameKind {
    Function,
    Global,
}

impl RenameKind {
    /// Prompt label shown when asking the user for a new name.
    pub fn prompt(self) -> &'static str {
        match self {
            RenameKind::Function => "Please enter function name",
            RenameKind::Global => "Please enter global variable name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub old_name: String,
    pub new_name: String,
    pub kind: RenameKind,
    pub address: Address,
}

/// Reject `new_name` if it would be ambiguous.
///
/// A name is taken if any function or global already uses it, or if the
/// shown function's code already carries it as a plain (`Default`) name, which
/// catches locals the symbol source does not know about.
pub fn check_unique(
    symbols: &dyn SymbolSource,
    shown: &TaggedText,
    new_name: &str,
) -> ViewerResult<()> {
    if symbols.is_name_taken(new_name) || shown.contains_envelope(ColorClass::Default, new_name) {
        return Err(ViewerError::NameCollision(new_name.to_string()));
    }
    Ok(())
}

/// Rename a symbol and rewrite every cached rendering of it.
///
/// Validation and the symbol-source update both happen before any cache
/// entry is touched, so a failure leaves everything as it was. Returns the
/// number of cache entries rewritten.
pub fn propagate_rename(
    symbols: &mut dyn SymbolSource,
    cache: &mut DecompiledCache,
    shown: &TaggedText,
    request: &RenameRequest,
) -> ViewerResult<usize> {
    let RenameRequest { old_name, new_name, kind, address } = request;
    if new_name.is_empty() || new_name == old_name {
        return Err(ViewerError::InvalidName(format!("\"{new_name}\" is empty or unchanged")));
    }
    if new_name.chars().any(char::is_control) {
        return Err(ViewerError::InvalidName(format!(
            "\"{}\" contains control characters",
            new_name.escape_debug()
        )));
    }

    check_unique(symbols, shown, new_name)?;

    if !symbols.set_name(*address, new_name) {
        return Err(ViewerError::SymbolUpdateFailed {
            address: *address,
            new_name: new_name.clone(),
        });
    }

    let rewritten = cache.rewrite_envelopes(ColorClass::Default, old_name, new_name);
    tracing::info!(
        kind = ?kind,
        address = *address,
        old_name = %old_name,
        new_name = %new_name,
        rewritten,
        "renamed symbol"
    );
    Ok(rewritten)
}
