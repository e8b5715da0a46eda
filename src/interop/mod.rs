//! Interoperability - the engine's native calling interface
//!
//! Architecture:
//! - `types.rs` - `#[repr(C)]` mirrors of the engine ABI
//! - `binding.rs` - `EngineBinding`, the injected engine capability
//! - `library.rs` - dynamic library loading (libloading)
//! - `native.rs` - `EngineBinding` over a loaded libclang
//! - `scripted.rs` - in-memory `EngineBinding` with ownership counters
//! - `marshal.rs` - engine string to host string conversion

mod binding;
mod library;
mod marshal;
mod native;
mod scripted;
pub mod types;

pub use binding::{EngineBinding, RecordLayout};
pub use library::{Library, LoadError, SymbolError, DEFAULT_LIBRARY_NAME};
pub use marshal::{take_string, EngineString};
pub use native::LibclangBinding;
pub use scripted::{
    EngineStats, RecordedCompletion, RecordedParse, ScriptedCandidate, ScriptedEngine,
};

#[cfg(test)]
mod tests;
