use thiserror::Error;

use crate::model::Address;
use crate::services::decompiler::DecompileError;

/// Outcome taxonomy for viewer operations.
///
/// `NoWordUnderCursor`, `Unclassified` and `CacheMiss` are quiet outcomes: the
/// triggering action is dropped without telling the user. `NameCollision` and
/// `SymbolUpdateFailed` are meant to be surfaced as a blocking warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("No word under cursor")]
    NoWordUnderCursor,

    #[error("Token under cursor is not a well-formed span")]
    Unclassified,

    #[error("Name \"{0}\" is not unique")]
    NameCollision(String),

    #[error("Symbol source refused to rename {address:#x} to \"{new_name}\"")]
    SymbolUpdateFailed { address: Address, new_name: String },

    #[error("No decompiled code cached for function at {0:#x}")]
    CacheMiss(Address),

    #[error("No function is being shown")]
    NoFunctionShown,

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Cannot store comment for function at {0:#x}")]
    CommentRejected(Address),

    #[error("Cannot change declaration to: {0}")]
    DeclarationRejected(String),

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Decompile(#[from] DecompileError),
}

impl ViewerError {
    /// Whether the host should show this error to the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ViewerError::NameCollision(_)
                | ViewerError::SymbolUpdateFailed { .. }
                | ViewerError::InvalidName(_)
                | ViewerError::CommentRejected(_)
                | ViewerError::DeclarationRejected(_)
                | ViewerError::Unsupported(_)
                | ViewerError::Decompile(_)
        )
    }
}

/// Convenience result type for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;
