mod common;

use pseudoview_core::model::{Function, GlobalVariable, Storage, SymbolKind};
use pseudoview_core::symbols::{classify, SymbolSource, SymbolTable};
use pseudoview_core::tagged::{ColorClass, ResolvedWord};

fn word(word: &str, color: ColorClass) -> ResolvedWord {
    ResolvedWord { word: word.into(), color }
}

#[test]
fn default_colour_resolves_functions_and_globals() {
    let symbols = common::symbols();

    match classify(&symbols, None, &word("helper", ColorClass::Default)) {
        SymbolKind::Function(f) => assert_eq!(f.address, common::HELPER),
        other => panic!("expected function, got {other:?}"),
    }
    match classify(&symbols, None, &word("counter", ColorClass::Default)) {
        SymbolKind::Global(g) => assert_eq!(g.storage, Storage::Memory(common::G_COUNTER)),
        other => panic!("expected global by real name, got {other:?}"),
    }
    assert_eq!(
        classify(&symbols, None, &word("nothing", ColorClass::Default)),
        SymbolKind::Unclassified
    );
}

#[test]
fn function_wins_over_global_with_the_same_name() {
    let mut symbols = SymbolTable::new();
    symbols.add_function(Function::new("dup", 0x10)).add_global(GlobalVariable::in_memory("dup", 0x20));

    let kind = classify(&symbols, None, &word("dup", ColorClass::Default));
    assert!(matches!(kind, SymbolKind::Function(ref f) if f.address == 0x10));
    assert_eq!(kind.address(), Some(0x10));
}

#[test]
fn identifier_colour_only_matches_current_parameters() {
    let symbols = common::symbols();
    let main = symbols.function_at(common::MAIN).expect("main");

    assert_eq!(
        classify(&symbols, Some(&main), &word("argc", ColorClass::Identifier)),
        SymbolKind::CurrentParameter { name: "argc".into() }
    );
    assert_eq!(
        classify(&symbols, Some(&main), &word("count", ColorClass::Identifier)),
        SymbolKind::CurrentParameter { name: "count".into() }
    );
    assert_eq!(
        classify(&symbols, None, &word("argc", ColorClass::Identifier)),
        SymbolKind::Unclassified
    );
    assert_eq!(
        classify(&symbols, Some(&main), &word("local", ColorClass::Identifier)),
        SymbolKind::Unclassified
    );
}

#[test]
fn other_colours_are_never_symbols() {
    let symbols = common::symbols();
    for color in [ColorClass::ImportName, ColorClass::Other(6)] {
        assert_eq!(classify(&symbols, None, &word("helper", color)), SymbolKind::Unclassified);
    }
}

#[test]
fn symbol_table_renames_functions_and_memory_globals_only() {
    let mut symbols = common::symbols();
    assert!(symbols.set_name(common::HELPER, "do_work"));
    assert!(symbols.function_by_name("do_work").is_some());
    assert!(symbols.set_name(common::G_COUNTER, "g_total"));
    assert!(symbols.is_name_taken("g_total"));
    assert!(!symbols.set_name(0xdead, "nope"));
}
