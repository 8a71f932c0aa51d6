//! The explicitly-owned state of one viewing session.
//!
//! A [`Session`] owns the navigation history, the decompiled cache, the visible
//! buffer and the redisplay scheduler, and borrows nothing global. Every
//! mutation of that state happens through `&mut Session`, i.e. on the thread
//! that owns it; worker threads only send results back through the scheduler.

pub mod cache;
pub mod history;
pub mod rename;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigSink;
use crate::error::{ViewerError, ViewerResult};
use crate::model::{Address, Function, Storage, SymbolKind};
use crate::services::decompiler::Decompiler;
use crate::services::redisplay::{Generation, Redisplay, RedisplayScheduler, TextSource};
use crate::symbols::{classify, SymbolSource};
use crate::tagged::{ResolvedWord, TaggedText, TextPosition};

pub use cache::DecompiledCache;
pub use history::NavigationHistory;
pub use rename::{RenameKind, RenameRequest};

/// Longest function comment accepted, in characters.
pub const MAX_COMMENT_LEN: usize = 1024;

/// The text currently on screen.
#[derive(Debug, Clone)]
pub struct View {
    pub function: Function,
    pub text: TaggedText,
    pub generation: Generation,
    pub source: TextSource,
}

/// What a request to show a function turned into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ShowOutcome {
    /// A redisplay was scheduled.
    Scheduled { address: Address, generation: Generation },
    /// The function is already current and `force` was not set.
    AlreadyShown { address: Address },
    /// Nothing to decompile here; the host should jump to the disassembly.
    JumpToAsm { address: Address },
    /// The name is not a known function or memory global.
    Unknown,
}

/// What a back/forward request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum NavigationOutcome {
    Moved { address: Address, generation: Generation },
    /// Already at the start (or end) of the history.
    CannotMove,
    /// The cursor moved but no cached code exists for the target.
    CacheMiss { address: Address },
}

/// Result of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub rewritten_entries: usize,
    /// Redisplay of the shown function, unless it disappeared from the symbol source.
    pub generation: Option<Generation>,
    /// Serialized config snapshot, if a config sink is attached and succeeded.
    pub snapshot: Option<String>,
}

pub struct Session {
    symbols: Box<dyn SymbolSource>,
    cache: DecompiledCache,
    history: NavigationHistory,
    scheduler: RedisplayScheduler,
    config_sink: Option<Box<dyn ConfigSink>>,
    visible: Option<View>,
    /// Generation of the last redisplay applied, successful or not.
    settled: Generation,
}

impl Session {
    /// Start a session against a symbol source and a decompiler.
    pub fn new(symbols: Box<dyn SymbolSource>, decompiler: Arc<dyn Decompiler>) -> Self {
        Self {
            symbols,
            cache: DecompiledCache::new(),
            history: NavigationHistory::new(),
            scheduler: RedisplayScheduler::new(decompiler),
            config_sink: None,
            visible: None,
            settled: Generation(0),
        }
    }

    /// Builder-style helper to attach the collaborator regenerated after renames.
    pub fn with_config_sink(mut self, sink: Box<dyn ConfigSink>) -> Self {
        self.config_sink = Some(sink);
        self
    }

    pub fn symbols(&self) -> &dyn SymbolSource {
        self.symbols.as_ref()
    }

    pub fn cache(&self) -> &DecompiledCache {
        &self.cache
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn visible(&self) -> Option<&View> {
        self.visible.as_ref()
    }

    /// The function the history cursor points at, freshly read from the symbol source.
    pub fn current_function(&self) -> Option<Function> {
        self.history.current().and_then(|address| self.symbols.function_at(address))
    }

    /// Resolve the word under a cursor in the visible buffer.
    pub fn word_at(&self, position: TextPosition) -> ViewerResult<ResolvedWord> {
        let view = self.visible.as_ref().ok_or(ViewerError::NoWordUnderCursor)?;
        view.text.word_at(position)
    }

    /// Resolve and classify the word under a cursor in the visible buffer.
    pub fn symbol_at(&self, position: TextPosition) -> ViewerResult<(ResolvedWord, SymbolKind)> {
        let word = self.word_at(position)?;
        let current = self.current_function();
        let kind = classify(self.symbols.as_ref(), current.as_ref(), &word);
        Ok((word, kind))
    }

    /// Show the function or global called `name`.
    ///
    /// Memory globals and functions without a body are handed back to the host
    /// as a jump. A user-defined function is pushed onto the history and a
    /// redisplay is scheduled, unless it is already current and `force` is
    /// not set.
    pub fn show_function(&mut self, name: &str, force: bool, force_decompile: bool) -> ShowOutcome {
        if let Some(global) = self.symbols.global_by_name_or_real_name(name) {
            if let Storage::Memory(address) = global.storage {
                tracing::info!(name, address, "global variable, jump to disassembly");
                return ShowOutcome::JumpToAsm { address };
            }
        }

        let Some(function) = self.symbols.function_by_name(name) else {
            tracing::info!(name, "unknown function, nothing to show");
            return ShowOutcome::Unknown;
        };

        if !function.user_defined {
            tracing::info!(name, address = function.address, "not user-defined, jump to disassembly");
            return ShowOutcome::JumpToAsm { address: function.address };
        }

        let address = function.address;
        if !self.history.push(address, force) {
            tracing::info!(name, address, "function already shown");
            return ShowOutcome::AlreadyShown { address };
        }

        let generation = self.schedule_redisplay(function, force_decompile);
        ShowOutcome::Scheduled { address, generation }
    }

    /// Move back one entry in the history and redisplay it from the cache.
    pub fn back(&mut self) -> NavigationOutcome {
        tracing::debug!(history = ?self.history.entries(), cursor = ?self.history.cursor(), "move back");
        match self.history.back() {
            Some(address) => self.redisplay_cached(address),
            None => {
                tracing::debug!("first entry, cannot move to the previous");
                NavigationOutcome::CannotMove
            }
        }
    }

    /// Move forward one entry in the history and redisplay it from the cache.
    pub fn forward(&mut self) -> NavigationOutcome {
        tracing::debug!(history = ?self.history.entries(), cursor = ?self.history.cursor(), "move forward");
        match self.history.forward() {
            Some(address) => self.redisplay_cached(address),
            None => {
                tracing::debug!("last entry, cannot move to the next");
                NavigationOutcome::CannotMove
            }
        }
    }

    fn redisplay_cached(&mut self, address: Address) -> NavigationOutcome {
        if !self.cache.contains(address) {
            tracing::debug!(address, "no cached code, navigation dropped");
            return NavigationOutcome::CacheMiss { address };
        }
        let Some(function) = self.symbols.function_at(address) else {
            tracing::debug!(address, "function vanished from symbol source");
            return NavigationOutcome::CacheMiss { address };
        };
        let generation = self.schedule_redisplay(function, false);
        NavigationOutcome::Moved { address, generation }
    }

    /// Rename a function or global and propagate it through every cached rendering.
    ///
    /// Uniqueness is also checked against the code of the function currently
    /// shown. On success the config sink is regenerated and the current
    /// function is redisplayed.
    pub fn rename(&mut self, request: &RenameRequest) -> ViewerResult<RenameOutcome> {
        let shown_address = self.history.current().ok_or(ViewerError::NoFunctionShown)?;
        let shown = self
            .cache
            .get(shown_address)
            .cloned()
            .ok_or(ViewerError::CacheMiss(shown_address))?;

        let rewritten_entries =
            rename::propagate_rename(self.symbols.as_mut(), &mut self.cache, &shown, request)?;

        let snapshot = match self.config_sink.as_mut() {
            Some(sink) => match sink.regenerate(self.symbols.as_ref()) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    tracing::warn!(error = %err, "config regeneration failed after rename");
                    None
                }
            },
            None => None,
        };

        // The rename is already committed.
        let generation = match self.symbols.function_at(shown_address) {
            Some(function) => Some(self.schedule_redisplay(function, false)),
            None => {
                tracing::warn!(
                    address = shown_address,
                    "shown function vanished after rename; skipping redisplay"
                );
                None
            }
        };
        Ok(RenameOutcome { rewritten_entries, generation, snapshot })
    }

    /// Replace the current function's comment and re-decompile it.
    ///
    /// Comments longer than [`MAX_COMMENT_LEN`] characters are truncated.
    pub fn edit_comment(&mut self, comment: &str) -> ViewerResult<Generation> {
        let function = self.current_function().ok_or(ViewerError::NoFunctionShown)?;
        let comment: String = comment.chars().take(MAX_COMMENT_LEN).collect();
        if !self.symbols.set_function_comment(function.address, &comment) {
            return Err(ViewerError::CommentRejected(function.address));
        }
        Ok(self.schedule_redisplay(function, true))
    }

    /// Apply a new declaration to `function` and re-decompile it.
    pub fn change_declaration(
        &mut self,
        function: &Function,
        declaration: &str,
    ) -> ViewerResult<ShowOutcome> {
        if !self.symbols.apply_declaration(function.address, declaration) {
            return Err(ViewerError::DeclarationRejected(declaration.to_string()));
        }
        Ok(self.show_function(&function.name, true, true))
    }

    fn schedule_redisplay(&mut self, function: Function, force_decompile: bool) -> Generation {
        let cached = self.cache.get(function.address).cloned();
        self.scheduler.schedule(function, cached, force_decompile)
    }

    /// True while the latest scheduled redisplay has not been applied yet.
    pub fn redisplay_pending(&self) -> bool {
        self.settled < self.scheduler.latest()
    }

    /// Apply finished redisplays without blocking. Returns the new view, if any.
    pub fn pump(&mut self) -> Option<&View> {
        let redisplay = self.scheduler.drain()?;
        self.apply(redisplay)
    }

    /// Block until the latest scheduled redisplay lands (or `timeout` elapses).
    pub fn wait_for_redisplay(&mut self, timeout: Duration) -> Option<&View> {
        let redisplay = self.scheduler.wait_latest(timeout)?;
        self.apply(redisplay)
    }

    fn apply(&mut self, redisplay: Redisplay) -> Option<&View> {
        let Redisplay { generation, function, outcome } = redisplay;
        self.settled = generation;
        match outcome {
            Ok((text, source)) => {
                if source == TextSource::Decompiler {
                    self.cache.put(function.address, text.clone());
                }
                tracing::debug!(
                    generation = generation.0,
                    function = %function.name,
                    source = ?source,
                    "showing function"
                );
                self.visible = Some(View { function, text, generation, source });
                self.visible.as_ref()
            }
            Err(err) => {
                tracing::warn!(error = %err, function = %function.name, "decompilation failed");
                None
            }
        }
    }
}
