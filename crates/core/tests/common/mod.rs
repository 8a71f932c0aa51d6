// Shared fixtures for the core integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pseudoview_core::actions::HostUi;
use pseudoview_core::model::{Address, Function, GlobalVariable, Parameter};
use pseudoview_core::services::decompiler::FixtureDecompiler;
use pseudoview_core::symbols::SymbolTable;
use pseudoview_core::tagged::{envelope, ColorClass};
use pseudoview_core::Session;

pub const MAIN: Address = 0x1000;
pub const HELPER: Address = 0x1100;
pub const UNRELATED: Address = 0x1200;
pub const PUTS: Address = 0x2000;
pub const G_COUNTER: Address = 0x3000;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn name(word: &str) -> String {
    envelope(ColorClass::Default, word)
}

pub fn ident(word: &str) -> String {
    envelope(ColorClass::Identifier, word)
}

/// Line 2 of `main` is `  helper(g_counter);` once stripped.
pub fn main_code() -> String {
    format!(
        "int {}(int {})\n{{\n  {}({});\n  return {};\n}}",
        name("main"),
        ident("argc"),
        name("helper"),
        name("g_counter"),
        ident("argc"),
    )
}

/// Line 2 of `helper` is `  puts("hi");` once stripped.
pub fn helper_code() -> String {
    format!("void {}(void)\n{{\n  {}(\"hi\");\n}}", name("helper"), name("puts"))
}

pub fn unrelated_code() -> String {
    format!("int {}(void)", name("unrelated"))
}

pub fn symbols() -> SymbolTable {
    let mut table = SymbolTable::new();
    table
        .add_function(
            Function::new("main", MAIN)
                .with_parameters(vec![Parameter::new("argc").with_real_name("count")]),
        )
        .add_function(Function::new("helper", HELPER))
        .add_function(Function::new("unrelated", UNRELATED))
        .add_function(Function::external("puts", PUTS))
        .add_global(GlobalVariable::in_memory("g_counter", G_COUNTER).with_real_name("counter"))
        .add_global(GlobalVariable::in_register("r_tmp"))
        .set_declaration(HELPER, "void helper(void);");
    table
}

pub fn decompiler() -> FixtureDecompiler {
    FixtureDecompiler::new()
        .with_code(MAIN, main_code())
        .with_code(HELPER, helper_code())
        .with_code(UNRELATED, unrelated_code())
}

pub fn session() -> Session {
    Session::new(Box::new(symbols()), Arc::new(decompiler()))
}

/// Show `name` and wait until it is on screen.
pub fn show(session: &mut Session, name: &str) {
    session.show_function(name, false, false);
    let view = session.wait_for_redisplay(WAIT).expect("redisplay");
    assert_eq!(view.function.name, name);
}

/// Host that records calls and answers prompts from a queue.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub jumps: Vec<Address>,
    pub xrefs: Vec<Address>,
    pub calls: Vec<Address>,
    pub warnings: Vec<String>,
    pub prompts: Vec<(String, String)>,
    pub answers: Vec<Option<String>>,
}

impl RecordingHost {
    pub fn answering(answers: Vec<Option<&str>>) -> Self {
        Self {
            answers: answers.into_iter().rev().map(|a| a.map(str::to_string)).collect(),
            ..Self::default()
        }
    }

    fn next_answer(&mut self, initial: &str, label: &str) -> Option<String> {
        self.prompts.push((initial.to_string(), label.to_string()));
        self.answers.pop().flatten()
    }
}

impl HostUi for RecordingHost {
    fn jump_to(&mut self, address: Address) {
        self.jumps.push(address);
    }

    fn open_xrefs(&mut self, address: Address) {
        self.xrefs.push(address);
    }

    fn open_calls(&mut self, address: Address) {
        self.calls.push(address);
    }

    fn prompt_text(&mut self, initial: &str, label: &str) -> Option<String> {
        self.next_answer(initial, label)
    }

    fn prompt_line(&mut self, initial: &str, label: &str) -> Option<String> {
        self.next_answer(initial, label)
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
