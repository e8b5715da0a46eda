//! AST node reference

use crate::interop::types::{CXCursor, CX_CURSOR_TRANSLATION_UNIT};
use core::ffi::c_int;
use core::marker::PhantomData;

/// Reference to one node of a translation unit's AST
///
/// Borrows the translation unit it came from. Two cursors compare equal when
/// they carry the same engine handle, even if they were fetched separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'tu> {
    raw: CXCursor,
    _unit: PhantomData<&'tu ()>,
}

impl<'tu> Cursor<'tu> {
    pub(crate) fn new(raw: CXCursor) -> Self {
        Self {
            raw,
            _unit: PhantomData,
        }
    }

    #[inline]
    pub fn as_raw(&self) -> CXCursor {
        self.raw
    }

    /// Raw `CXCursorKind`
    #[inline]
    pub fn kind(&self) -> c_int {
        self.raw.kind
    }

    #[inline]
    pub fn is_translation_unit(&self) -> bool {
        self.raw.kind == CX_CURSOR_TRANSLATION_UNIT
    }
}
