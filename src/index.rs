//! Engine session (`CXIndex`)

use crate::errors::{BridgeError, Result};
use crate::interop::types::CXIndex;
use crate::interop::EngineBinding;
use core::ffi::c_int;

/// One engine session, threaded through every parse call
///
/// Sessions created with [`Index::new`] are disposed on drop. Sessions wrapped
/// with [`Index::from_raw`] belong to the caller and are left alone.
pub struct Index<'e> {
    engine: &'e dyn EngineBinding,
    raw: CXIndex,
    owned: bool,
}

impl<'e> Index<'e> {
    /// Create a session with `clang_createIndex`
    pub fn new(
        engine: &'e dyn EngineBinding,
        exclude_pch: bool,
        display_diagnostics: bool,
    ) -> Result<Self> {
        // SAFETY: plain values in, fresh handle out.
        let raw =
            unsafe { engine.create_index(exclude_pch as c_int, display_diagnostics as c_int) };
        if raw.is_null() {
            return Err(BridgeError::InvalidHandle { what: "index" });
        }
        tracing::debug!(index = ?raw, exclude_pch, display_diagnostics, "created engine session");
        Ok(Self {
            engine,
            raw,
            owned: true,
        })
    }

    /// Create a session with the settings from `[engine]`
    pub fn from_config(
        engine: &'e dyn EngineBinding,
        config: &crate::config::EngineConfig,
    ) -> Result<Self> {
        Self::new(engine, config.exclude_pch, config.display_diagnostics)
    }

    /// Borrow a session created elsewhere
    ///
    /// # Safety
    /// `raw` must be a live index created through `engine`, and must outlive
    /// every translation unit parsed from the returned wrapper.
    pub unsafe fn from_raw(engine: &'e dyn EngineBinding, raw: CXIndex) -> Result<Self> {
        if raw.is_null() {
            return Err(BridgeError::InvalidHandle { what: "index" });
        }
        Ok(Self {
            engine,
            raw,
            owned: false,
        })
    }

    #[inline]
    pub fn engine(&self) -> &'e dyn EngineBinding {
        self.engine
    }

    #[inline]
    pub fn as_raw(&self) -> CXIndex {
        self.raw
    }
}

impl Drop for Index<'_> {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: created by `new`, disposed only here.
            unsafe { self.engine.dispose_index(self.raw) };
        }
    }
}

impl core::fmt::Debug for Index<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Index")
            .field("raw", &self.raw)
            .field("owned", &self.owned)
            .finish()
    }
}
