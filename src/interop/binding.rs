//! Engine capability boundary
//!
//! Every native entry point the bridge needs is a method on [`EngineBinding`].
//! Components receive the binding explicitly; nothing reaches the engine through
//! global state.

use super::types::{
    CXCodeCompleteResults, CXCompletionResult, CXCompletionString, CXCursor, CXIndex, CXString,
    CXTranslationUnit, CXUnsavedFile,
};
use core::ffi::{c_char, c_int, c_uint};
use core::mem::{align_of, offset_of, size_of};

/// Shape of one completion record as the engine describes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub size: usize,
    pub align: usize,
    /// Byte offset of the completion-string field, `None` if the engine's
    /// record has no such field.
    pub completion_string: Option<usize>,
}

impl RecordLayout {
    /// Layout of the host-side `CXCompletionResult` mirror
    pub const fn host() -> Self {
        Self {
            size: size_of::<CXCompletionResult>(),
            align: align_of::<CXCompletionResult>(),
            completion_string: Some(offset_of!(CXCompletionResult, completion_string)),
        }
    }
}

/// Native calling interface of the compiler-services engine
///
/// Method names track the libclang entry points they stand for. All pointer
/// arguments follow libclang's ownership rules.
pub trait EngineBinding {
    /// `clang_createIndex`
    ///
    /// # Safety
    /// Calls into native code.
    unsafe fn create_index(&self, exclude_pch: c_int, display_diagnostics: c_int) -> CXIndex;

    /// `clang_disposeIndex`
    ///
    /// # Safety
    /// `index` must come from `create_index` and not have been disposed.
    unsafe fn dispose_index(&self, index: CXIndex);

    /// `clang_createTranslationUnitFromSourceFile`
    ///
    /// # Safety
    /// `source` and every slot of `args` must point at NUL-terminated strings
    /// that stay alive for the duration of the call.
    unsafe fn create_translation_unit_from_source_file(
        &self,
        index: CXIndex,
        source: *const c_char,
        num_args: c_int,
        args: *const *const c_char,
        num_unsaved: c_uint,
        unsaved: *mut CXUnsavedFile,
    ) -> CXTranslationUnit;

    /// `clang_parseTranslationUnit`
    ///
    /// # Safety
    /// Same requirements as `create_translation_unit_from_source_file`.
    #[allow(clippy::too_many_arguments)]
    unsafe fn parse_translation_unit(
        &self,
        index: CXIndex,
        source: *const c_char,
        args: *const *const c_char,
        num_args: c_int,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> CXTranslationUnit;

    /// `clang_disposeTranslationUnit`
    ///
    /// # Safety
    /// `tu` must be live and must not be used afterwards.
    unsafe fn dispose_translation_unit(&self, tu: CXTranslationUnit);

    /// `clang_getTranslationUnitCursor`
    ///
    /// # Safety
    /// `tu` must be live.
    unsafe fn translation_unit_cursor(&self, tu: CXTranslationUnit) -> CXCursor;

    /// `clang_defaultCodeCompleteOptions`
    fn default_code_complete_options(&self) -> c_uint;

    /// `clang_codeCompleteAt`
    ///
    /// # Safety
    /// `tu` must be live and `filename` NUL-terminated for the duration of the call.
    #[allow(clippy::too_many_arguments)]
    unsafe fn code_complete_at(
        &self,
        tu: CXTranslationUnit,
        filename: *const c_char,
        line: c_uint,
        column: c_uint,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> *mut CXCodeCompleteResults;

    /// `clang_disposeCodeCompleteResults`
    ///
    /// # Safety
    /// `results` must come from `code_complete_at` and be disposed exactly once.
    unsafe fn dispose_code_complete_results(&self, results: *mut CXCodeCompleteResults);

    /// Layout of the records inside a completion result block
    fn completion_record_layout(&self) -> RecordLayout {
        RecordLayout::host()
    }

    /// `clang_getCompletionAvailability`
    ///
    /// # Safety
    /// `s` must belong to a result block that has not been disposed.
    unsafe fn completion_availability(&self, s: CXCompletionString) -> c_int;

    /// `clang_getCompletionPriority`
    ///
    /// # Safety
    /// See `completion_availability`.
    unsafe fn completion_priority(&self, s: CXCompletionString) -> c_uint;

    /// `clang_getCompletionBriefComment`
    ///
    /// # Safety
    /// See `completion_availability`. The returned string must be disposed.
    unsafe fn completion_brief_comment(&self, s: CXCompletionString) -> CXString;

    /// `clang_getNumCompletionChunks`
    ///
    /// # Safety
    /// See `completion_availability`.
    unsafe fn num_completion_chunks(&self, s: CXCompletionString) -> c_uint;

    /// `clang_getCompletionChunkText`
    ///
    /// # Safety
    /// See `completion_availability`. The returned string must be disposed.
    unsafe fn completion_chunk_text(&self, s: CXCompletionString, index: c_uint) -> CXString;

    /// `clang_getCompletionChunkKind`
    ///
    /// # Safety
    /// See `completion_availability`.
    unsafe fn completion_chunk_kind(&self, s: CXCompletionString, index: c_uint) -> c_int;

    /// `clang_getCString`
    ///
    /// # Safety
    /// `s` must not have been disposed.
    unsafe fn c_string(&self, s: CXString) -> *const c_char;

    /// `clang_disposeString`
    ///
    /// # Safety
    /// `s` must be disposed exactly once.
    unsafe fn dispose_string(&self, s: CXString);
}
