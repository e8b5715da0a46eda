//! Dynamic library loading and symbol resolution
//!
//! Thin wrapper over `libloading` that keeps the error surface small.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Platform file name of the engine library
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_NAME: &str = "libclang.dylib";
#[cfg(windows)]
pub const DEFAULT_LIBRARY_NAME: &str = "libclang.dll";
#[cfg(not(any(target_os = "macos", windows)))]
pub const DEFAULT_LIBRARY_NAME: &str = "libclang.so";

/// Handle to dynamically loaded library
pub struct Library {
    inner: libloading::Library,
    origin: PathBuf,
}

impl Library {
    /// Load library by name
    ///
    /// Searches standard library paths. Use `load_path` for absolute paths.
    pub fn load(name: &str) -> Result<Self, LoadError> {
        if name.is_empty() || name.contains('\0') {
            return Err(LoadError::InvalidName);
        }
        Self::load_impl(Path::new(name))
    }

    /// Load library from an explicit path
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LoadError::InvalidName);
        }
        Self::load_impl(path)
    }

    fn load_impl(path: &Path) -> Result<Self, LoadError> {
        // SAFETY: loading runs the library's initialisers; libclang's are benign.
        let inner = unsafe { libloading::Library::new(path) }.map_err(|e| LoadError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(library = %path.display(), "loaded engine library");

        Ok(Self {
            inner,
            origin: path.to_path_buf(),
        })
    }

    /// Where this library was loaded from
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Resolve a symbol and copy out its value
    ///
    /// # Safety
    /// `T` must match the real type of the exported symbol, and the returned
    /// value must not be used after this `Library` is dropped.
    pub unsafe fn symbol<T: Copy>(&self, name: &str) -> Result<T, SymbolError> {
        if name.contains('\0') {
            return Err(SymbolError::InvalidName);
        }
        self.inner
            .get::<T>(name.as_bytes())
            .map(|sym| *sym)
            .map_err(|e| SymbolError::NotFound {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

impl core::fmt::Debug for Library {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Library").field("origin", &self.origin).finish()
    }
}

/// Library loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid library name")]
    InvalidName,
    #[error("failed to load library {}: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },
}

/// Symbol lookup errors
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("invalid symbol name")]
    InvalidName,
    #[error("symbol `{name}` not found: {reason}")]
    NotFound { name: String, reason: String },
}
