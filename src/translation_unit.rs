//! Translation units - one parsed compilation owned by the engine

use crate::allocator::CallArena;
use crate::completion::{self, CompletionCandidate, CompletionObserver, TracingObserver};
use crate::config::CompletionConfig;
use crate::cursor::Cursor;
use crate::errors::{BridgeError, Result};
use crate::flags::ParseFlags;
use crate::index::Index;
use crate::interop::types::CXTranslationUnit;
use crate::interop::EngineBinding;
use core::ffi::c_int;
use std::path::{Path, PathBuf};
use tracing::debug;

/// In-memory replacement for a file on disk
///
/// Accepted by [`TranslationUnit::parse`] but not forwarded to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedFile {
    pub filename: PathBuf,
    pub contents: String,
}

/// Parsed source file plus its includes
///
/// Holds the engine's compilation handle and disposes it on drop. Borrows the
/// session it was parsed in.
pub struct TranslationUnit<'i> {
    engine: &'i dyn EngineBinding,
    raw: CXTranslationUnit,
}

impl<'i> TranslationUnit<'i> {
    /// Parse `file` with `clang_createTranslationUnitFromSourceFile`
    pub fn from_source<S: AsRef<str>>(
        index: &'i Index<'_>,
        file: impl AsRef<Path>,
        args: &[S],
    ) -> Result<Self> {
        let engine = index.engine();
        let file = file.as_ref();

        let arena = CallArena::new();
        let source = arena.path(file)?;
        let argv = arena.marshal_args(args)?;
        let num_args = arg_count(argv.len())?;

        debug!(file = %file.display(), args = num_args, "creating translation unit from source");

        // SAFETY: `source` and every argv slot live in `arena`, which outlives the call.
        let raw = unsafe {
            engine.create_translation_unit_from_source_file(
                index.as_raw(),
                source.as_ptr(),
                num_args,
                argv.as_ptr(),
                0,
                core::ptr::null_mut(),
            )
        };

        Self::wrap(engine, raw)
    }

    /// Parse `file` with `clang_parseTranslationUnit`
    ///
    /// `unsaved_files` is accepted for interface compatibility only; the engine
    /// always sees the files on disk.
    pub fn parse<S: AsRef<str>>(
        index: &'i Index<'_>,
        file: impl AsRef<Path>,
        args: &[S],
        unsaved_files: &[UnsavedFile],
        flags: ParseFlags,
    ) -> Result<Self> {
        let engine = index.engine();
        let file = file.as_ref();

        let arena = CallArena::new();
        let source = arena.path(file)?;
        let argv = arena.marshal_args(args)?;
        let num_args = arg_count(argv.len())?;
        let options = flags.encode();

        if !unsaved_files.is_empty() {
            debug!(count = unsaved_files.len(), "ignoring unsaved file overrides");
        }
        debug!(
            file = %file.display(),
            args = num_args,
            flags = options,
            "parsing translation unit"
        );

        // SAFETY: as in `from_source`.
        let raw = unsafe {
            engine.parse_translation_unit(
                index.as_raw(),
                source.as_ptr(),
                argv.as_ptr(),
                num_args,
                core::ptr::null_mut(),
                0,
                options,
            )
        };

        Self::wrap(engine, raw)
    }

    fn wrap(engine: &'i dyn EngineBinding, raw: CXTranslationUnit) -> Result<Self> {
        if raw.is_null() {
            return Err(BridgeError::InvalidHandle {
                what: "translation unit",
            });
        }
        Ok(Self { engine, raw })
    }

    /// Root cursor, fetched from the engine on every call
    pub fn cursor(&self) -> Result<Cursor<'_>> {
        // SAFETY: `raw` stays live until `self` drops.
        let raw = unsafe { self.engine.translation_unit_cursor(self.raw) };
        if raw.is_null() {
            return Err(BridgeError::InvalidHandle { what: "cursor" });
        }
        Ok(Cursor::new(raw))
    }

    /// Complete code at a 1-based `line`/`column` of `file`
    ///
    /// With `raw` set, availability and chunk kinds are the engine's integers
    /// instead of labels. Diagnostics go to `tracing`.
    pub fn code_complete_at(
        &self,
        file: impl AsRef<Path>,
        line: u32,
        column: u32,
        raw: bool,
    ) -> Result<Vec<CompletionCandidate>> {
        completion::complete(
            self.engine,
            self.raw,
            file.as_ref(),
            line,
            column,
            raw,
            &TracingObserver,
        )
    }

    /// Like [`code_complete_at`](Self::code_complete_at), with the mode taken
    /// from configuration and diagnostics sent to `observer`
    pub fn code_complete_with(
        &self,
        file: impl AsRef<Path>,
        line: u32,
        column: u32,
        config: &CompletionConfig,
        observer: &dyn CompletionObserver,
    ) -> Result<Vec<CompletionCandidate>> {
        completion::complete(
            self.engine,
            self.raw,
            file.as_ref(),
            line,
            column,
            config.raw,
            observer,
        )
    }

    #[inline]
    pub fn as_raw(&self) -> CXTranslationUnit {
        self.raw
    }
}

impl Drop for TranslationUnit<'_> {
    fn drop(&mut self) {
        // SAFETY: non-null by construction and disposed only here.
        unsafe { self.engine.dispose_translation_unit(self.raw) };
    }
}

impl core::fmt::Debug for TranslationUnit<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TranslationUnit").field("raw", &self.raw).finish()
    }
}

fn arg_count(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| {
        BridgeError::allocation(
            "argument vector",
            format!("{len} arguments exceed the engine limit"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::ScriptedEngine;

    #[test]
    fn test_from_source_passes_arguments_and_no_overrides() {
        let engine = ScriptedEngine::new();
        let index = Index::new(&engine, false, false).unwrap();
        let _tu =
            TranslationUnit::from_source(&index, "main.cpp", &["-std=c++11", "-Iinclude"]).unwrap();

        let call = engine.last_parse().unwrap();
        assert_eq!(call.source, "main.cpp");
        assert_eq!(call.args, vec!["-std=c++11", "-Iinclude"]);
        assert_eq!(call.options, None);
        assert_eq!(call.num_unsaved, 0);
        assert!(call.unsaved_is_null);
    }

    #[test]
    fn test_parse_encodes_flags_and_drops_unsaved_files() {
        let engine = ScriptedEngine::new();
        let index = Index::new(&engine, false, false).unwrap();
        let unsaved = [UnsavedFile {
            filename: "main.c".into(),
            contents: "int main() {}".into(),
        }];
        let flags = ParseFlags::new().incomplete(true).precompiled_preamble(true);
        let _tu =
            TranslationUnit::parse(&index, "main.c", &[] as &[&str], &unsaved, flags).unwrap();

        let call = engine.last_parse().unwrap();
        assert_eq!(call.options, Some(6));
        assert!(call.args.is_empty());
        assert_eq!(call.num_unsaved, 0);
        assert!(call.unsaved_is_null);
    }

    #[test]
    fn test_null_handle_rejected_at_construction() {
        let engine = ScriptedEngine::new().failing_parse();
        let index = Index::new(&engine, false, false).unwrap();

        let err = TranslationUnit::from_source(&index, "a.c", &[] as &[&str]).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidHandle { what: "translation unit" }));

        let err = TranslationUnit::parse(&index, "a.c", &[] as &[&str], &[], ParseFlags::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidHandle { .. }));
    }

    #[test]
    fn test_bad_argument_never_reaches_engine() {
        let engine = ScriptedEngine::new();
        let index = Index::new(&engine, false, false).unwrap();

        let err = TranslationUnit::from_source(&index, "a.c", &["-D\0"]).unwrap_err();
        assert!(matches!(err, BridgeError::Allocation { .. }));
        assert!(engine.last_parse().is_none());
    }

    #[test]
    fn test_cursor_requeried_and_handle_equal() {
        let engine = ScriptedEngine::new();
        let index = Index::new(&engine, false, false).unwrap();
        let tu = TranslationUnit::from_source(&index, "a.c", &[] as &[&str]).unwrap();

        let first = tu.cursor().unwrap();
        let second = tu.cursor().unwrap();
        assert_eq!(first, second);
        assert!(first.is_translation_unit());
        assert_eq!(engine.stats().cursor_queries, 2);
    }

    #[test]
    fn test_null_cursor_is_invalid_handle() {
        let engine = ScriptedEngine::new().null_cursor();
        let index = Index::new(&engine, false, false).unwrap();
        let tu = TranslationUnit::from_source(&index, "a.c", &[] as &[&str]).unwrap();

        assert!(matches!(tu.cursor(), Err(BridgeError::InvalidHandle { what: "cursor" })));
    }

    #[test]
    fn test_units_and_index_disposed_on_drop() {
        let engine = ScriptedEngine::new();
        {
            let index = Index::new(&engine, true, false).unwrap();
            let _a = TranslationUnit::from_source(&index, "a.c", &[] as &[&str]).unwrap();
            let _b = TranslationUnit::from_source(&index, "b.c", &[] as &[&str]).unwrap();
        }
        let stats = engine.stats();
        assert_eq!(stats.translation_units_created, 2);
        assert_eq!(stats.translation_units_disposed, 2);
        assert_eq!(stats.indexes_disposed, 1);
        assert_eq!(stats.invalid_disposals, 0);
    }
}
