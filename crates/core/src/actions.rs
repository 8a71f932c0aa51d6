//! User actions over a session, expressed against an abstract host UI.
//!
//! Key and mouse dispatch stay with the host; it maps its input to an
//! [`Action`] and calls [`perform`]. Quiet outcomes (nothing under the cursor,
//! malformed span, cache miss) do nothing; user-facing failures go to
//! [`HostUi::warn`].

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::model::{Address, Storage, SymbolKind};
use crate::session::{RenameKind, RenameRequest, Session, ShowOutcome, MAX_COMMENT_LEN};
use crate::tagged::{ColorClass, TextPosition};

/// Services the embedding application provides.
pub trait HostUi {
    fn jump_to(&mut self, address: Address);
    fn open_xrefs(&mut self, address: Address);
    fn open_calls(&mut self, address: Address);
    /// Ask for multi-line text. `None` means cancelled.
    fn prompt_text(&mut self, initial: &str, label: &str) -> Option<String>;
    /// Ask for a single line. `None` means cancelled.
    fn prompt_line(&mut self, initial: &str, label: &str) -> Option<String>;
    fn warn(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Double-click: show the function (or jump to the global) under the cursor.
    Activate,
    JumpToAsm,
    Rename,
    ChangeDeclaration,
    OpenXrefs,
    OpenCalls,
    EditComment,
    MoveBack,
    MoveForward,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Activate => "Show",
            Action::JumpToAsm => "Jump to ASM",
            Action::Rename => "Rename",
            Action::ChangeDeclaration => "Change type declaration",
            Action::OpenXrefs => "Open xrefs window",
            Action::OpenCalls => "Open calls window",
            Action::EditComment => "Edit func comment",
            Action::MoveBack => "Move backward",
            Action::MoveForward => "Move forward",
        }
    }
}

/// Actions that make sense for the word under `position`, in menu order.
pub fn context_actions(session: &Session, position: TextPosition) -> Vec<Action> {
    let mut actions = Vec::new();
    match session.symbol_at(position) {
        Ok((_, SymbolKind::Function(function))) => {
            actions.extend([Action::JumpToAsm, Action::Rename]);
            if session.history().current() == Some(function.address) {
                actions.push(Action::ChangeDeclaration);
            }
            actions.extend([Action::OpenXrefs, Action::OpenCalls]);
        }
        Ok((_, SymbolKind::Global(_))) => {
            actions.extend([Action::JumpToAsm, Action::Rename]);
        }
        _ => {}
    }
    actions.extend([Action::EditComment, Action::MoveBack, Action::MoveForward]);
    actions
}

/// Run `action` at `position`, reporting user-facing failures through the host.
pub fn perform(session: &mut Session, host: &mut dyn HostUi, action: Action, position: TextPosition) {
    let result = match action {
        Action::Activate => activate(session, host, position),
        Action::JumpToAsm => jump_to_asm(session, host, position),
        Action::Rename => rename_at_cursor(session, host, position).map(|_| ()),
        Action::ChangeDeclaration => change_declaration(session, host, position),
        Action::OpenXrefs => function_address_at(session, position).map(|a| host.open_xrefs(a)),
        Action::OpenCalls => function_address_at(session, position).map(|a| host.open_calls(a)),
        Action::EditComment => edit_comment(session, host).map(|_| ()),
        Action::MoveBack => {
            session.back();
            Ok(())
        }
        Action::MoveForward => {
            session.forward();
            Ok(())
        }
    };
    if let Err(err) = result {
        report(host, &err);
    }
}

/// Surface `err` to the user if it is not one of the quiet outcomes.
pub fn report(host: &mut dyn HostUi, err: &ViewerError) {
    if err.is_user_visible() {
        host.warn(&err.to_string());
    } else {
        tracing::debug!(error = %err, "action dropped");
    }
}

/// Show what the word under the cursor names, if it is a plain or imported name.
pub fn activate(session: &mut Session, host: &mut dyn HostUi, position: TextPosition) -> ViewerResult<()> {
    let word = session.word_at(position)?;
    if !matches!(word.color, ColorClass::Default | ColorClass::ImportName) {
        return Ok(());
    }
    if let ShowOutcome::JumpToAsm { address } = session.show_function(&word.word, false, false) {
        host.jump_to(address);
    }
    Ok(())
}

/// Jump to the disassembly of the function or memory global under the cursor.
pub fn jump_to_asm(session: &mut Session, host: &mut dyn HostUi, position: TextPosition) -> ViewerResult<()> {
    let (_, kind) = session.symbol_at(position)?;
    if let Some(address) = kind.address() {
        host.jump_to(address);
    }
    Ok(())
}

fn function_address_at(session: &Session, position: TextPosition) -> ViewerResult<Address> {
    match session.symbol_at(position)? {
        (_, SymbolKind::Function(function)) => Ok(function.address),
        _ => Err(ViewerError::Unclassified),
    }
}

/// Prompt for a new name for the function or global under the cursor and apply it.
///
/// Returns `Ok(false)` when nothing was renamed (cancelled, empty or unchanged input).
pub fn rename_at_cursor(
    session: &mut Session,
    host: &mut dyn HostUi,
    position: TextPosition,
) -> ViewerResult<bool> {
    if session.history().current().is_none() {
        return Err(ViewerError::NoFunctionShown);
    }
    let (word, kind) = session.symbol_at(position)?;
    let (kind, address) = match kind {
        SymbolKind::Function(function) => (RenameKind::Function, function.address),
        SymbolKind::Global(global) => match global.storage {
            Storage::Memory(address) => (RenameKind::Global, address),
            Storage::Register => {
                return Err(ViewerError::Unsupported(
                    "Renaming register globals is not supported.".into(),
                ))
            }
        },
        SymbolKind::CurrentParameter { .. } | SymbolKind::Unclassified => return Ok(false),
    };

    let Some(new_name) = host.prompt_line(&word.word, kind.prompt()) else {
        return Ok(false);
    };
    // Surrounding whitespace from the prompt is never part of a name.
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() || new_name == word.word {
        return Ok(false);
    }

    session.rename(&RenameRequest { old_name: word.word, new_name, kind, address })?;
    Ok(true)
}

/// Prompt for the current function's comment and store it.
pub fn edit_comment(session: &mut Session, host: &mut dyn HostUi) -> ViewerResult<bool> {
    let function = session.current_function().ok_or(ViewerError::NoFunctionShown)?;
    let existing = session.symbols().function_comment(function.address).unwrap_or_default();
    let label = format!("Please enter function comment (max {MAX_COMMENT_LEN} characters)");
    let Some(comment) = host.prompt_text(&existing, &label) else {
        return Ok(false);
    };
    session.edit_comment(&comment)?;
    Ok(true)
}

/// Prompt for a new declaration of the function under the cursor.
///
/// Only the function currently shown can be retyped, and never `main`.
pub fn change_declaration(
    session: &mut Session,
    host: &mut dyn HostUi,
    position: TextPosition,
) -> ViewerResult<()> {
    let function = match session.symbol_at(position)? {
        (_, SymbolKind::Function(function))
            if session.history().current() == Some(function.address) && function.name != "main" =>
        {
            function
        }
        (_, SymbolKind::Global(global)) if matches!(global.storage, Storage::Memory(_)) => {
            return Err(ViewerError::Unsupported(
                "Setting type for global variable is not supported at the moment.".into(),
            ));
        }
        _ => return Ok(()),
    };

    let Some(current) = session.symbols().declaration(function.address) else {
        return Err(ViewerError::Unsupported(format!(
            "Cannot change declaration for: {}",
            function.name
        )));
    };
    let Some(declaration) = host.prompt_line(&current, "Please enter type declaration:") else {
        return Ok(());
    };
    if declaration.trim().is_empty() {
        return Ok(());
    }
    session.change_declaration(&function, &declaration)?;
    Ok(())
}
