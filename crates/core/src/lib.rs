//! pseudoview-core
//!
//! Core library for exploring decompiled pseudocode delivered as colour-tagged
//! text.
//!
//! This crate resolves the word under a cursor to a function, global or
//! parameter, keeps an append-only navigation history over shown functions,
//! caches decompiled code, and renames symbols across every cached rendering.
//! Decompilers, symbol stores and the host UI sit behind traits so the logic
//! stays testable and reusable from multiple frontends.

pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod services;
pub mod session;
pub mod symbols;
pub mod tagged;

pub use error::{ViewerError, ViewerResult};
pub use session::Session;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
