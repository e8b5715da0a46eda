//! cindex-bridge - host-side marshalling for the libclang compiler-services engine
//!
//! The engine is reached only through an explicitly constructed [`EngineBinding`].
//! This crate converts host arguments into the engine's native layouts and decodes
//! the engine's code-completion result blocks back into plain Rust values.

pub mod allocator;
pub mod completion;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod flags;
pub mod index;
pub mod interop;
pub mod logging;
pub mod translation_unit;

// Re-export core types
pub use allocator::{ArgumentBuffer, CallArena};
pub use completion::{
    Availability, Chunk, ChunkKind, ChunkValue, CompletionCandidate, CompletionObserver,
    NoopObserver, Tag, TracingObserver,
};
pub use config::{BridgeConfig, CompletionConfig, EngineConfig};
pub use cursor::Cursor;
pub use errors::{BridgeError, Result};
pub use flags::ParseFlags;
pub use index::Index;
pub use interop::{EngineBinding, LibclangBinding, RecordLayout, ScriptedCandidate, ScriptedEngine};
pub use translation_unit::TranslationUnit;
