use crate::model::{Function, SymbolKind};
use crate::symbols::SymbolSource;
use crate::tagged::{ColorClass, ResolvedWord};

/// Decide what a resolved word refers to.
///
/// `Default`-coloured words are looked up as functions first, then as globals.
/// `Identifier`-coloured words only matter when they name a parameter of
/// `current`, the function on screen.
pub fn classify(
    symbols: &dyn SymbolSource,
    current: Option<&Function>,
    resolved: &ResolvedWord,
) -> SymbolKind {
    let word = resolved.word.as_str();
    match resolved.color {
        ColorClass::Default => {
            if let Some(function) = symbols.function_by_name(word) {
                SymbolKind::Function(function)
            } else if let Some(global) = symbols.global_by_name_or_real_name(word) {
                SymbolKind::Global(global)
            } else {
                SymbolKind::Unclassified
            }
        }
        ColorClass::Identifier => match current {
            Some(function) if function.has_parameter(word) => {
                SymbolKind::CurrentParameter { name: word.to_string() }
            }
            _ => SymbolKind::Unclassified,
        },
        _ => SymbolKind::Unclassified,
    }
}
