//! Error type shared by every layer of the bridge

use crate::interop::{LoadError, SymbolError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A host value could not be copied into a native allocation.
    #[error("failed to marshal {what}: {reason}")]
    Allocation { what: String, reason: String },

    /// The engine handed back a null handle.
    #[error("engine returned an invalid {what} handle")]
    InvalidHandle { what: &'static str },

    /// The engine's native records do not match the host's view of them.
    #[error("completion result schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    /// Disposal requested on a result block that was already released.
    #[error("completion results were already disposed")]
    ResultDisposal,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl BridgeError {
    pub fn allocation(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Allocation {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        Self::SchemaMismatch { reason: reason.into() }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}
