//! `EngineBinding` backed by a dynamically loaded libclang

use super::binding::EngineBinding;
use super::library::{Library, DEFAULT_LIBRARY_NAME};
use super::types::{
    CXCodeCompleteResults, CXCompletionString, CXCursor, CXIndex, CXString, CXTranslationUnit,
    CXUnsavedFile,
};
use crate::config::EngineConfig;
use crate::errors::Result;
use core::ffi::{c_char, c_int, c_uint};
use std::path::{Path, PathBuf};

type CreateIndexFn = unsafe extern "C" fn(c_int, c_int) -> CXIndex;
type DisposeIndexFn = unsafe extern "C" fn(CXIndex);
type CreateFromSourceFn = unsafe extern "C" fn(
    CXIndex,
    *const c_char,
    c_int,
    *const *const c_char,
    c_uint,
    *mut CXUnsavedFile,
) -> CXTranslationUnit;
type ParseFn = unsafe extern "C" fn(
    CXIndex,
    *const c_char,
    *const *const c_char,
    c_int,
    *mut CXUnsavedFile,
    c_uint,
    c_uint,
) -> CXTranslationUnit;
type DisposeTuFn = unsafe extern "C" fn(CXTranslationUnit);
type TuCursorFn = unsafe extern "C" fn(CXTranslationUnit) -> CXCursor;
type DefaultOptionsFn = unsafe extern "C" fn() -> c_uint;
type CodeCompleteAtFn = unsafe extern "C" fn(
    CXTranslationUnit,
    *const c_char,
    c_uint,
    c_uint,
    *mut CXUnsavedFile,
    c_uint,
    c_uint,
) -> *mut CXCodeCompleteResults;
type DisposeResultsFn = unsafe extern "C" fn(*mut CXCodeCompleteResults);
type AvailabilityFn = unsafe extern "C" fn(CXCompletionString) -> c_int;
type PriorityFn = unsafe extern "C" fn(CXCompletionString) -> c_uint;
type BriefCommentFn = unsafe extern "C" fn(CXCompletionString) -> CXString;
type NumChunksFn = unsafe extern "C" fn(CXCompletionString) -> c_uint;
type ChunkTextFn = unsafe extern "C" fn(CXCompletionString, c_uint) -> CXString;
type ChunkKindFn = unsafe extern "C" fn(CXCompletionString, c_uint) -> c_int;
type GetCStringFn = unsafe extern "C" fn(CXString) -> *const c_char;
type DisposeStringFn = unsafe extern "C" fn(CXString);

/// Resolved libclang entry points
///
/// All symbols are looked up at construction; a missing one fails the load.
pub struct LibclangBinding {
    create_index: CreateIndexFn,
    dispose_index: DisposeIndexFn,
    create_from_source: CreateFromSourceFn,
    parse: ParseFn,
    dispose_tu: DisposeTuFn,
    tu_cursor: TuCursorFn,
    default_options: DefaultOptionsFn,
    code_complete_at: CodeCompleteAtFn,
    dispose_results: DisposeResultsFn,
    availability: AvailabilityFn,
    priority: PriorityFn,
    brief_comment: BriefCommentFn,
    num_chunks: NumChunksFn,
    chunk_text: ChunkTextFn,
    chunk_kind: ChunkKindFn,
    get_c_string: GetCStringFn,
    dispose_string: DisposeStringFn,
    // Keeps every function pointer above valid; must be the last field dropped.
    library: Library,
}

impl LibclangBinding {
    /// Bind to an already loaded library
    pub fn new(library: Library) -> Result<Self> {
        // SAFETY: every type alias above matches the prototype in clang-c/Index.h,
        // and the pointers live as long as `library`, which we own.
        let binding = unsafe {
            Self {
                create_index: library.symbol("clang_createIndex")?,
                dispose_index: library.symbol("clang_disposeIndex")?,
                create_from_source: library.symbol("clang_createTranslationUnitFromSourceFile")?,
                parse: library.symbol("clang_parseTranslationUnit")?,
                dispose_tu: library.symbol("clang_disposeTranslationUnit")?,
                tu_cursor: library.symbol("clang_getTranslationUnitCursor")?,
                default_options: library.symbol("clang_defaultCodeCompleteOptions")?,
                code_complete_at: library.symbol("clang_codeCompleteAt")?,
                dispose_results: library.symbol("clang_disposeCodeCompleteResults")?,
                availability: library.symbol("clang_getCompletionAvailability")?,
                priority: library.symbol("clang_getCompletionPriority")?,
                brief_comment: library.symbol("clang_getCompletionBriefComment")?,
                num_chunks: library.symbol("clang_getNumCompletionChunks")?,
                chunk_text: library.symbol("clang_getCompletionChunkText")?,
                chunk_kind: library.symbol("clang_getCompletionChunkKind")?,
                get_c_string: library.symbol("clang_getCString")?,
                dispose_string: library.symbol("clang_disposeString")?,
                library,
            }
        };
        tracing::debug!(
            library = %binding.library.origin().display(),
            "bound libclang entry points"
        );
        Ok(binding)
    }

    /// Load libclang from an explicit path
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Library::load_path(path)?)
    }

    /// Load libclang using the configured path, `LIBCLANG_PATH`, or the platform default
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let env = std::env::var_os("LIBCLANG_PATH").map(PathBuf::from);
        match resolve_library_path(config.library_path.as_deref(), env) {
            Some(path) => Self::load_path(path),
            None => Self::new(Library::load(DEFAULT_LIBRARY_NAME)?),
        }
    }
}

/// Pick the library file to load; `None` searches the system paths
///
/// `LIBCLANG_PATH` may name either the library itself or its directory.
pub(crate) fn resolve_library_path(
    configured: Option<&str>,
    env: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(PathBuf::from(path));
    }
    match env {
        Some(dir) if dir.is_dir() => Some(dir.join(DEFAULT_LIBRARY_NAME)),
        Some(file) => Some(file),
        None => None,
    }
}

impl EngineBinding for LibclangBinding {
    unsafe fn create_index(&self, exclude_pch: c_int, display_diagnostics: c_int) -> CXIndex {
        (self.create_index)(exclude_pch, display_diagnostics)
    }

    unsafe fn dispose_index(&self, index: CXIndex) {
        (self.dispose_index)(index)
    }

    unsafe fn create_translation_unit_from_source_file(
        &self,
        index: CXIndex,
        source: *const c_char,
        num_args: c_int,
        args: *const *const c_char,
        num_unsaved: c_uint,
        unsaved: *mut CXUnsavedFile,
    ) -> CXTranslationUnit {
        (self.create_from_source)(index, source, num_args, args, num_unsaved, unsaved)
    }

    unsafe fn parse_translation_unit(
        &self,
        index: CXIndex,
        source: *const c_char,
        args: *const *const c_char,
        num_args: c_int,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> CXTranslationUnit {
        (self.parse)(index, source, args, num_args, unsaved, num_unsaved, options)
    }

    unsafe fn dispose_translation_unit(&self, tu: CXTranslationUnit) {
        (self.dispose_tu)(tu)
    }

    unsafe fn translation_unit_cursor(&self, tu: CXTranslationUnit) -> CXCursor {
        (self.tu_cursor)(tu)
    }

    fn default_code_complete_options(&self) -> c_uint {
        // SAFETY: takes no arguments and touches no caller state.
        unsafe { (self.default_options)() }
    }

    unsafe fn code_complete_at(
        &self,
        tu: CXTranslationUnit,
        filename: *const c_char,
        line: c_uint,
        column: c_uint,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> *mut CXCodeCompleteResults {
        (self.code_complete_at)(tu, filename, line, column, unsaved, num_unsaved, options)
    }

    unsafe fn dispose_code_complete_results(&self, results: *mut CXCodeCompleteResults) {
        (self.dispose_results)(results)
    }

    unsafe fn completion_availability(&self, s: CXCompletionString) -> c_int {
        (self.availability)(s)
    }

    unsafe fn completion_priority(&self, s: CXCompletionString) -> c_uint {
        (self.priority)(s)
    }

    unsafe fn completion_brief_comment(&self, s: CXCompletionString) -> CXString {
        (self.brief_comment)(s)
    }

    unsafe fn num_completion_chunks(&self, s: CXCompletionString) -> c_uint {
        (self.num_chunks)(s)
    }

    unsafe fn completion_chunk_text(&self, s: CXCompletionString, index: c_uint) -> CXString {
        (self.chunk_text)(s, index)
    }

    unsafe fn completion_chunk_kind(&self, s: CXCompletionString, index: c_uint) -> c_int {
        (self.chunk_kind)(s, index)
    }

    unsafe fn c_string(&self, s: CXString) -> *const c_char {
        (self.get_c_string)(s)
    }

    unsafe fn dispose_string(&self, s: CXString) {
        (self.dispose_string)(s)
    }
}

impl core::fmt::Debug for LibclangBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LibclangBinding")
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}
