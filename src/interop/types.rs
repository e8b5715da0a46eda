//! Type definitions mirroring the engine's C ABI
//!
//! Layouts follow `clang-c/Index.h` and `clang-c/CXString.h`.

use core::ffi::{c_char, c_int, c_uint, c_ulong, c_void};
use core::ptr;

/// Session handle (`CXIndex`)
pub type CXIndex = *mut c_void;

/// Compilation handle (`CXTranslationUnit`)
pub type CXTranslationUnit = *mut c_void;

/// Per-candidate completion string handle (`CXCompletionString`)
pub type CXCompletionString = *mut c_void;

/// `CXCursorKind` value for a translation unit root
pub const CX_CURSOR_TRANSLATION_UNIT: c_int = 300;

/// Engine-owned string (`CXString`)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CXString {
    pub data: *const c_void,
    pub private_flags: c_uint,
}

impl CXString {
    #[inline]
    pub const fn null() -> Self {
        Self {
            data: ptr::null(),
            private_flags: 0,
        }
    }
}

/// AST node reference (`CXCursor`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CXCursor {
    pub kind: c_int,
    pub xdata: c_int,
    pub data: [*const c_void; 3],
}

impl CXCursor {
    /// Equivalent of `clang_getNullCursor()`
    #[inline]
    pub const fn null() -> Self {
        Self {
            kind: 70,
            xdata: 0,
            data: [ptr::null(); 3],
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.iter().all(|p| p.is_null())
    }
}

/// One record of a completion result block (`CXCompletionResult`)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CXCompletionResult {
    pub cursor_kind: c_int,
    pub completion_string: CXCompletionString,
}

/// Result block returned by `clang_codeCompleteAt` (`CXCodeCompleteResults`)
#[repr(C)]
#[derive(Debug)]
pub struct CXCodeCompleteResults {
    pub results: *mut CXCompletionResult,
    pub num_results: c_uint,
}

/// In-memory file override (`CXUnsavedFile`)
///
/// Never populated by this crate; overrides are always passed as `NULL, 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CXUnsavedFile {
    pub filename: *const c_char,
    pub contents: *const c_char,
    pub length: c_ulong,
}
