// Shared project fixtures for the CLI tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pseudoview_core::model::{Function, GlobalVariable, Parameter};
use pseudoview_core::services::decompiler::CodeEntry;
use pseudoview_core::symbols::SymbolSet;
use pseudoview_core::tagged::{envelope, ColorClass, TaggedText};

pub const MAIN: u64 = 0x1000;
pub const HELPER: u64 = 0x1100;
pub const PUTS: u64 = 0x2000;
pub const G_COUNTER: u64 = 0x3000;

pub fn symbol_set() -> SymbolSet {
    SymbolSet {
        functions: vec![
            Function::new("main", MAIN)
                .with_parameters(vec![Parameter::new("argc").with_real_name("count")]),
            Function::new("helper", HELPER),
            Function::external("puts", PUTS),
        ],
        globals: vec![GlobalVariable::in_memory("g_counter", G_COUNTER)],
    }
}

/// `main` line 2 reads `  helper(g_counter);`, `helper` line 2 reads `  puts("hi");`.
pub fn code_entries() -> Vec<CodeEntry> {
    let name = |w: &str| envelope(ColorClass::Default, w);
    let ident = |w: &str| envelope(ColorClass::Identifier, w);
    vec![
        CodeEntry {
            address: MAIN,
            code: TaggedText::parse(format!(
                "int {}(int {})\n{{\n  {}({});\n  return {};\n}}",
                name("main"),
                ident("argc"),
                name("helper"),
                name("g_counter"),
                ident("argc"),
            )),
        },
        CodeEntry {
            address: HELPER,
            code: TaggedText::parse(format!(
                "void {}(void)\n{{\n  {}(\"hi\");\n}}",
                name("helper"),
                name("puts")
            )),
        },
    ]
}

pub fn write_symbols(dir: &Path) -> PathBuf {
    let path = dir.join("symbols.json");
    fs::write(&path, serde_json::to_string_pretty(&symbol_set()).expect("symbols json"))
        .expect("write symbols");
    path
}

pub fn write_code(dir: &Path) -> PathBuf {
    let path = dir.join("code.json");
    fs::write(&path, serde_json::to_string_pretty(&code_entries()).expect("code json"))
        .expect("write code");
    path
}

pub fn write_script(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("session.yaml");
    fs::write(&path, yaml).expect("write script");
    path
}
