//! Call-scoped arena for native call inputs
//!
//! Every NUL-terminated copy handed to the engine lives in a `CallArena`.
//! Buffers borrow the arena, so the borrow checker keeps the backing
//! allocations alive until the native call has returned, on every exit path.

use crate::errors::{BridgeError, Result};
use core::ffi::c_char;
use core::marker::PhantomData;
use std::ffi::{CStr, CString};
use std::path::Path;
use typed_arena::Arena;

/// Owner of the per-call native string copies
pub struct CallArena {
    strings: Arena<CString>,
}

impl CallArena {
    pub fn new() -> Self {
        Self {
            strings: Arena::new(),
        }
    }

    /// Copy `value` into a NUL-terminated allocation owned by the arena
    pub fn c_str(&self, what: impl FnOnce() -> String, value: &str) -> Result<&CStr> {
        let owned = CString::new(value).map_err(|e| {
            BridgeError::allocation(
                what(),
                format!("interior NUL byte at offset {}", e.nul_position()),
            )
        })?;
        Ok(self.strings.alloc(owned).as_c_str())
    }

    /// Copy a file path into the arena
    pub fn path(&self, path: &Path) -> Result<&CStr> {
        let owned = path_to_cstring(path)?;
        Ok(self.strings.alloc(owned).as_c_str())
    }

    /// Build the pointer vector for an argument list
    ///
    /// Slot `i` points at a fresh copy of `args[i]`. Nothing is handed to the
    /// engine if any argument fails to marshal.
    pub fn marshal_args<S: AsRef<str>>(&self, args: &[S]) -> Result<ArgumentBuffer<'_>> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(args.len())
            .map_err(|e| BridgeError::allocation("argument vector", e))?;

        for (i, arg) in args.iter().enumerate() {
            let copy = self.c_str(|| format!("argument {i}"), arg.as_ref())?;
            slots.push(copy.as_ptr());
        }

        tracing::trace!(args = slots.len(), "marshalled argument buffer");

        Ok(ArgumentBuffer {
            slots,
            _arena: PhantomData,
        })
    }

    /// Number of live copies held by the arena
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        BridgeError::allocation(path.display().to_string(), "interior NUL byte in path")
    })
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString> {
    let text = path.to_str().ok_or_else(|| {
        BridgeError::allocation(path.display().to_string(), "path is not valid UTF-8")
    })?;
    CString::new(text).map_err(|_| {
        BridgeError::allocation(path.display().to_string(), "interior NUL byte in path")
    })
}

/// Contiguous `const char *` vector ready to pass as `argv`
///
/// Cannot outlive the arena that owns its strings.
pub struct ArgumentBuffer<'a> {
    slots: Vec<*const c_char>,
    _arena: PhantomData<&'a CallArena>,
}

impl<'a> ArgumentBuffer<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Base address of the slot vector; null when empty
    pub fn as_ptr(&self) -> *const *const c_char {
        if self.slots.is_empty() {
            core::ptr::null()
        } else {
            self.slots.as_ptr()
        }
    }

    /// Read back the string a slot points at
    pub fn get(&self, index: usize) -> Option<&'a CStr> {
        let ptr = *self.slots.get(index)?;
        // SAFETY: every slot points into a `CString` owned by the arena borrowed for 'a.
        Some(unsafe { CStr::from_ptr(ptr) })
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CStr> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl core::fmt::Debug for ArgumentBuffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
