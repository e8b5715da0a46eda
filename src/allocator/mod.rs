//! Allocation for native calls
//!
//! Architecture:
//! - `arena.rs` - `CallArena` owns per-call NUL-terminated copies and builds
//!   `ArgumentBuffer`s that borrow it

mod arena;

pub use arena::{ArgumentBuffer, CallArena};
