//! Engine string marshaling - `CXString` to host `String`
//!
//! Each engine string is copied out once and released exactly once.

use super::binding::EngineBinding;
use super::types::CXString;
use std::ffi::CStr;

/// Engine-owned string released with `clang_disposeString` on drop
pub struct EngineString<'e> {
    engine: &'e dyn EngineBinding,
    raw: CXString,
}

impl<'e> EngineString<'e> {
    /// Take ownership of a string the engine just returned
    ///
    /// # Safety
    /// `raw` must be a fresh, undisposed `CXString` produced by `engine`.
    pub unsafe fn new(engine: &'e dyn EngineBinding, raw: CXString) -> Self {
        Self { engine, raw }
    }

    /// Copy the contents into a host string; `None` for a null string
    pub fn to_host(&self) -> Option<String> {
        // SAFETY: `raw` is live until `self` drops.
        let ptr = unsafe { self.engine.c_string(self.raw) };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: the engine guarantees NUL termination for non-null data.
        let text = unsafe { CStr::from_ptr(ptr) };
        Some(text.to_string_lossy().into_owned())
    }
}

impl Drop for EngineString<'_> {
    fn drop(&mut self) {
        // SAFETY: constructed from an undisposed string and released only here.
        unsafe { self.engine.dispose_string(self.raw) }
    }
}

/// Copy an engine string out and release it, mapping null to `None`
///
/// # Safety
/// See [`EngineString::new`].
pub unsafe fn take_string(engine: &dyn EngineBinding, raw: CXString) -> Option<String> {
    EngineString::new(engine, raw).to_host()
}
