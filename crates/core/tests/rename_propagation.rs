mod common;

use pseudoview_core::model::{Address, Function, GlobalVariable};
use pseudoview_core::session::rename::{propagate_rename, RenameKind, RenameRequest};
use pseudoview_core::session::DecompiledCache;
use pseudoview_core::symbols::{SymbolSource, SymbolTable};
use pseudoview_core::tagged::TaggedText;
use pseudoview_core::ViewerError;

fn cache() -> DecompiledCache {
    let mut cache = DecompiledCache::new();
    cache.put(common::MAIN, TaggedText::parse(common::main_code()));
    cache.put(common::HELPER, TaggedText::parse(common::helper_code()));
    cache.put(common::UNRELATED, TaggedText::parse(common::unrelated_code()));
    cache
}

fn request(old: &str, new: &str, kind: RenameKind, address: Address) -> RenameRequest {
    RenameRequest { old_name: old.into(), new_name: new.into(), kind, address }
}

fn snapshot(cache: &DecompiledCache) -> Vec<(Address, String)> {
    cache.iter().map(|(a, t)| (a, t.raw().to_string())).collect()
}

/// Symbol source that refuses every rename.
struct ReadOnly(SymbolTable);

impl SymbolSource for ReadOnly {
    fn functions(&self) -> Vec<Function> {
        self.0.functions()
    }
    fn globals(&self) -> Vec<GlobalVariable> {
        self.0.globals()
    }
    fn set_name(&mut self, _address: Address, _new_name: &str) -> bool {
        false
    }
    fn function_comment(&self, address: Address) -> Option<String> {
        self.0.function_comment(address)
    }
    fn set_function_comment(&mut self, _address: Address, _comment: &str) -> bool {
        false
    }
    fn declaration(&self, address: Address) -> Option<String> {
        self.0.declaration(address)
    }
    fn apply_declaration(&mut self, _address: Address, _declaration: &str) -> bool {
        false
    }
}

#[test]
fn rename_rewrites_every_cached_occurrence() {
    let mut symbols = common::symbols();
    let mut cache = cache();
    let shown = cache.get(common::HELPER).cloned().expect("helper code");
    let before = snapshot(&cache);

    let rewritten = propagate_rename(
        &mut symbols,
        &mut cache,
        &shown,
        &request("helper", "do_work", RenameKind::Function, common::HELPER),
    )
    .expect("rename");

    assert_eq!(rewritten, 2);
    assert_eq!(symbols.function_at(common::HELPER).expect("helper").name, "do_work");

    let old = common::name("helper");
    let new = common::name("do_work");
    for (address, raw) in snapshot(&cache) {
        assert!(!raw.contains(old.as_str()), "old name left in {address:#x}");
        if address == common::UNRELATED {
            let original = &before.iter().find(|(a, _)| *a == address).expect("entry").1;
            assert_eq!(&raw, original, "untouched entry must be byte-identical");
        } else {
            assert!(raw.contains(new.as_str()));
        }
    }
}

#[test]
fn rename_to_an_existing_global_collides_and_changes_nothing() {
    let mut symbols = common::symbols();
    symbols.add_global(GlobalVariable::in_memory("g_main", 0x4000));
    let mut cache = cache();
    let shown = cache.get(common::MAIN).cloned().expect("main code");
    let before = snapshot(&cache);

    let err = propagate_rename(
        &mut symbols,
        &mut cache,
        &shown,
        &request("main", "g_main", RenameKind::Function, common::MAIN),
    )
    .unwrap_err();

    assert_eq!(err, ViewerError::NameCollision("g_main".into()));
    assert_eq!(symbols.function_at(common::MAIN).expect("main").name, "main");
    assert_eq!(snapshot(&cache), before);
}

#[test]
fn collision_is_reported_for_every_existing_name_and_no_other() {
    let symbols = common::symbols();
    let shown = TaggedText::parse(common::unrelated_code());
    let taken: Vec<String> = symbols
        .functions()
        .into_iter()
        .map(|f| f.name)
        .chain(symbols.globals().into_iter().map(|g| g.name))
        .collect();

    for name in taken.iter().filter(|n| n.as_str() != "unrelated") {
        let mut symbols = common::symbols();
        let mut cache = cache();
        let err = propagate_rename(
            &mut symbols,
            &mut cache,
            &shown,
            &request("unrelated", name, RenameKind::Function, common::UNRELATED),
        )
        .unwrap_err();
        assert_eq!(err, ViewerError::NameCollision(name.clone()));
    }

    for name in ["fresh", "helper2", "g_counter_"] {
        let mut symbols = common::symbols();
        let mut cache = cache();
        propagate_rename(
            &mut symbols,
            &mut cache,
            &shown,
            &request("unrelated", name, RenameKind::Function, common::UNRELATED),
        )
        .expect("free name");
    }
}

#[test]
fn name_visible_in_the_shown_code_collides() {
    let mut symbols = SymbolTable::new();
    symbols.add_function(Function::new("f", 0x10));
    let shown = TaggedText::parse(format!("int {}; {}();", common::name("local_v"), common::name("f")));
    let mut cache = DecompiledCache::new();
    cache.put(0x10, shown.clone());

    let err = propagate_rename(
        &mut symbols,
        &mut cache,
        &shown,
        &request("f", "local_v", RenameKind::Function, 0x10),
    )
    .unwrap_err();
    assert_eq!(err, ViewerError::NameCollision("local_v".into()));
}

#[test]
fn refused_symbol_update_leaves_cache_untouched() {
    let mut symbols = ReadOnly(common::symbols());
    let mut cache = cache();
    let shown = cache.get(common::MAIN).cloned().expect("main code");
    let before = snapshot(&cache);

    let err = propagate_rename(
        &mut symbols,
        &mut cache,
        &shown,
        &request("helper", "do_work", RenameKind::Function, common::HELPER),
    )
    .unwrap_err();

    assert!(matches!(err, ViewerError::SymbolUpdateFailed { address, .. } if address == common::HELPER));
    assert!(err.is_user_visible());
    assert_eq!(snapshot(&cache), before);
}

#[test]
fn empty_or_unchanged_names_are_rejected() {
    let mut symbols = common::symbols();
    let mut cache = cache();
    let shown = TaggedText::parse(common::main_code());
    for new in ["", "helper", "bad\u{1}name"] {
        let err = propagate_rename(
            &mut symbols,
            &mut cache,
            &shown,
            &request("helper", new, RenameKind::Function, common::HELPER),
        )
        .unwrap_err();
        assert!(matches!(err, ViewerError::InvalidName(_)), "{new:?}");
    }
}
