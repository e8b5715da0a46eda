//! In-memory engine for tests, benchmarks and offline use
//!
//! `ScriptedEngine` answers every entry point from a fixed script and builds
//! completion result blocks in real native layout, so the decoder walks the
//! same memory shapes it sees from libclang. Every handle, string and result
//! block it hands out is tracked, which makes leaks and double disposal
//! observable through [`ScriptedEngine::stats`].

use super::binding::{EngineBinding, RecordLayout};
use super::types::{
    CXCodeCompleteResults, CXCompletionResult, CXCompletionString, CXCursor, CXIndex, CXString,
    CXTranslationUnit, CXUnsavedFile, CX_CURSOR_TRANSLATION_UNIT,
};
use core::ffi::{c_char, c_int, c_uint, c_void};
use core::ptr;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};

/// `CXCursorKind` reported for every scripted completion record
const SCRIPTED_RECORD_CURSOR_KIND: c_int = 72; // CXCursor_NotImplemented

/// One completion candidate the engine will report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCandidate {
    pub availability: c_int,
    pub priority: c_uint,
    pub comment: Option<String>,
    pub chunks: Vec<(c_int, String)>,
    /// Report this record with a null completion string
    pub null_string: bool,
    /// Chunk count reported instead of `chunks.len()`
    pub reported_chunks: Option<c_uint>,
}

impl ScriptedCandidate {
    pub fn new(availability: c_int, priority: c_uint) -> Self {
        Self {
            availability,
            priority,
            comment: None,
            chunks: Vec::new(),
            null_string: false,
            reported_chunks: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_chunk(mut self, kind: c_int, text: impl Into<String>) -> Self {
        self.chunks.push((kind, text.into()));
        self
    }

    pub fn with_null_string(mut self) -> Self {
        self.null_string = true;
        self
    }

    pub fn with_reported_chunks(mut self, count: c_uint) -> Self {
        self.reported_chunks = Some(count);
        self
    }
}

/// Arguments captured from the most recent parse entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedParse {
    pub source: String,
    pub args: Vec<String>,
    /// `None` for `clang_createTranslationUnitFromSourceFile`, which takes no flags
    pub options: Option<c_uint>,
    pub num_unsaved: c_uint,
    pub unsaved_is_null: bool,
}

/// Arguments captured from the most recent completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    pub filename: String,
    pub line: c_uint,
    pub column: c_uint,
    pub options: c_uint,
    pub num_unsaved: c_uint,
    pub unsaved_is_null: bool,
}

/// Counters over everything the engine handed out and took back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub indexes_created: usize,
    pub indexes_disposed: usize,
    pub translation_units_created: usize,
    pub translation_units_disposed: usize,
    pub cursor_queries: usize,
    pub completion_requests: usize,
    pub results_disposed: usize,
    /// Disposals of handles, blocks or strings that were not live
    pub invalid_disposals: usize,
    pub strings_created: usize,
    pub strings_disposed: usize,
    pub live_result_blocks: usize,
}

#[derive(Default)]
struct ScriptState {
    next_handle: usize,
    live_indexes: HashSet<usize>,
    live_units: HashSet<usize>,
    /// block address -> record count
    live_blocks: HashMap<usize, usize>,
    live_strings: HashSet<usize>,
    stats: EngineStats,
    last_parse: Option<RecordedParse>,
    last_completion: Option<RecordedCompletion>,
}

impl ScriptState {
    fn next_handle(&mut self) -> usize {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Scripted implementation of [`EngineBinding`]
pub struct ScriptedEngine {
    candidates: Vec<ScriptedCandidate>,
    layout: RecordLayout,
    default_options: c_uint,
    fail_parse: bool,
    null_cursor: bool,
    null_results: bool,
    state: Mutex<ScriptState>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            layout: RecordLayout::host(),
            // CXCodeComplete_IncludeMacros, libclang's default
            default_options: 0x01,
            fail_parse: false,
            null_cursor: false,
            null_results: false,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Candidates returned by every completion request
    pub fn with_candidates(mut self, candidates: Vec<ScriptedCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Record layout the engine claims its result blocks use
    pub fn with_record_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_default_options(mut self, options: c_uint) -> Self {
        self.default_options = options;
        self
    }

    /// Return null from both parse entry points
    pub fn failing_parse(mut self) -> Self {
        self.fail_parse = true;
        self
    }

    /// Return the null cursor for every root-cursor query
    pub fn null_cursor(mut self) -> Self {
        self.null_cursor = true;
        self
    }

    /// Return a null result block from every completion request
    pub fn null_results(mut self) -> Self {
        self.null_results = true;
        self
    }

    pub fn stats(&self) -> EngineStats {
        let state = self.state.lock();
        EngineStats {
            live_result_blocks: state.live_blocks.len(),
            ..state.stats
        }
    }

    pub fn last_parse(&self) -> Option<RecordedParse> {
        self.state.lock().last_parse.clone()
    }

    pub fn last_completion(&self) -> Option<RecordedCompletion> {
        self.state.lock().last_completion.clone()
    }

    fn record_parse(
        &self,
        source: *const c_char,
        args: *const *const c_char,
        num_args: c_int,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: Option<c_uint>,
    ) -> CXTranslationUnit {
        // SAFETY: the caller guarantees every slot is live for this call.
        let args = unsafe { read_args(args, num_args) };
        let source = unsafe { read_c_str(source) };

        let mut state = self.state.lock();
        state.last_parse = Some(RecordedParse {
            source,
            args,
            options,
            num_unsaved,
            unsaved_is_null: unsaved.is_null(),
        });

        if self.fail_parse {
            return ptr::null_mut();
        }
        let handle = state.next_handle();
        state.live_units.insert(handle);
        state.stats.translation_units_created += 1;
        handle as CXTranslationUnit
    }

    fn candidate<'a>(&'a self, s: CXCompletionString) -> &'a ScriptedCandidate {
        // SAFETY: completion strings are addresses into `self.candidates`, which
        // is never mutated once the engine is in use.
        unsafe { &*(s as *const ScriptedCandidate) }
    }

    fn new_string(&self, text: Option<&str>) -> CXString {
        let mut state = self.state.lock();
        state.stats.strings_created += 1;
        match text.and_then(|t| CString::new(t).ok()) {
            Some(owned) => {
                let data = owned.into_raw() as *const c_void;
                state.live_strings.insert(data as usize);
                CXString {
                    data,
                    private_flags: 1,
                }
            }
            None => CXString::null(),
        }
    }

    fn build_block(&self) -> *mut CXCodeCompleteResults {
        let records: Vec<CXCompletionResult> = self
            .candidates
            .iter()
            .map(|c| CXCompletionResult {
                cursor_kind: SCRIPTED_RECORD_CURSOR_KIND,
                completion_string: if c.null_string {
                    ptr::null_mut()
                } else {
                    c as *const ScriptedCandidate as CXCompletionString
                },
            })
            .collect();

        let count = records.len();
        let results = if count == 0 {
            ptr::null_mut()
        } else {
            Box::into_raw(records.into_boxed_slice()) as *mut CXCompletionResult
        };
        let block = Box::into_raw(Box::new(CXCodeCompleteResults {
            results,
            num_results: count as c_uint,
        }));

        self.state.lock().live_blocks.insert(block as usize, count);
        block
    }
}

/// Free a block built by `build_block`
///
/// # Safety
/// `block` must be live and came from `build_block` with `count` records.
unsafe fn free_block(block: *mut CXCodeCompleteResults, count: usize) {
    let block = Box::from_raw(block);
    if !block.results.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            block.results,
            count,
        )));
    }
}

unsafe fn read_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

unsafe fn read_args(args: *const *const c_char, num_args: c_int) -> Vec<String> {
    let count = usize::try_from(num_args).unwrap_or(0);
    if args.is_null() || count == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(args, count)
        .iter()
        .map(|&slot| read_c_str(slot))
        .collect()
}

impl EngineBinding for ScriptedEngine {
    unsafe fn create_index(&self, _exclude_pch: c_int, _display_diagnostics: c_int) -> CXIndex {
        let mut state = self.state.lock();
        let handle = state.next_handle();
        state.live_indexes.insert(handle);
        state.stats.indexes_created += 1;
        handle as CXIndex
    }

    unsafe fn dispose_index(&self, index: CXIndex) {
        let mut state = self.state.lock();
        if state.live_indexes.remove(&(index as usize)) {
            state.stats.indexes_disposed += 1;
        } else {
            state.stats.invalid_disposals += 1;
        }
    }

    unsafe fn create_translation_unit_from_source_file(
        &self,
        _index: CXIndex,
        source: *const c_char,
        num_args: c_int,
        args: *const *const c_char,
        num_unsaved: c_uint,
        unsaved: *mut CXUnsavedFile,
    ) -> CXTranslationUnit {
        self.record_parse(source, args, num_args, unsaved, num_unsaved, None)
    }

    unsafe fn parse_translation_unit(
        &self,
        _index: CXIndex,
        source: *const c_char,
        args: *const *const c_char,
        num_args: c_int,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> CXTranslationUnit {
        self.record_parse(source, args, num_args, unsaved, num_unsaved, Some(options))
    }

    unsafe fn dispose_translation_unit(&self, tu: CXTranslationUnit) {
        let mut state = self.state.lock();
        if state.live_units.remove(&(tu as usize)) {
            state.stats.translation_units_disposed += 1;
        } else {
            state.stats.invalid_disposals += 1;
        }
    }

    unsafe fn translation_unit_cursor(&self, tu: CXTranslationUnit) -> CXCursor {
        self.state.lock().stats.cursor_queries += 1;
        if self.null_cursor {
            return CXCursor::null();
        }
        CXCursor {
            kind: CX_CURSOR_TRANSLATION_UNIT,
            xdata: 0,
            data: [ptr::null(), ptr::null(), tu as *const c_void],
        }
    }

    fn default_code_complete_options(&self) -> c_uint {
        self.default_options
    }

    unsafe fn code_complete_at(
        &self,
        _tu: CXTranslationUnit,
        filename: *const c_char,
        line: c_uint,
        column: c_uint,
        unsaved: *mut CXUnsavedFile,
        num_unsaved: c_uint,
        options: c_uint,
    ) -> *mut CXCodeCompleteResults {
        let filename = read_c_str(filename);
        {
            let mut state = self.state.lock();
            state.stats.completion_requests += 1;
            state.last_completion = Some(RecordedCompletion {
                filename,
                line,
                column,
                options,
                num_unsaved,
                unsaved_is_null: unsaved.is_null(),
            });
        }
        if self.null_results {
            return ptr::null_mut();
        }
        self.build_block()
    }

    unsafe fn dispose_code_complete_results(&self, results: *mut CXCodeCompleteResults) {
        let mut state = self.state.lock();
        match state.live_blocks.remove(&(results as usize)) {
            Some(count) => {
                state.stats.results_disposed += 1;
                free_block(results, count);
            }
            None => state.stats.invalid_disposals += 1,
        }
    }

    fn completion_record_layout(&self) -> RecordLayout {
        self.layout
    }

    unsafe fn completion_availability(&self, s: CXCompletionString) -> c_int {
        self.candidate(s).availability
    }

    unsafe fn completion_priority(&self, s: CXCompletionString) -> c_uint {
        self.candidate(s).priority
    }

    unsafe fn completion_brief_comment(&self, s: CXCompletionString) -> CXString {
        let comment = self.candidate(s).comment.as_deref();
        self.new_string(comment)
    }

    unsafe fn num_completion_chunks(&self, s: CXCompletionString) -> c_uint {
        let candidate = self.candidate(s);
        candidate
            .reported_chunks
            .unwrap_or(candidate.chunks.len() as c_uint)
    }

    unsafe fn completion_chunk_text(&self, s: CXCompletionString, index: c_uint) -> CXString {
        let text = self
            .candidate(s)
            .chunks
            .get(index as usize)
            .map(|(_, text)| text.as_str());
        self.new_string(text)
    }

    unsafe fn completion_chunk_kind(&self, s: CXCompletionString, index: c_uint) -> c_int {
        self.candidate(s)
            .chunks
            .get(index as usize)
            .map(|(kind, _)| *kind)
            .unwrap_or(-1)
    }

    unsafe fn c_string(&self, s: CXString) -> *const c_char {
        s.data as *const c_char
    }

    unsafe fn dispose_string(&self, s: CXString) {
        let mut state = self.state.lock();
        state.stats.strings_disposed += 1;
        if s.data.is_null() {
            return;
        }
        if state.live_strings.remove(&(s.data as usize)) {
            drop(CString::from_raw(s.data as *mut c_char));
        } else {
            state.stats.invalid_disposals += 1;
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for (block, count) in state.live_blocks.drain() {
            // SAFETY: still-live blocks were built by `build_block` and never freed.
            unsafe { free_block(block as *mut CXCodeCompleteResults, count) };
        }
        for data in state.live_strings.drain() {
            // SAFETY: live strings came from `CString::into_raw` and were never freed.
            unsafe { drop(CString::from_raw(data as *mut c_char)) };
        }
    }
}

impl core::fmt::Debug for ScriptedEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("candidates", &self.candidates.len())
            .field("layout", &self.layout)
            .field("stats", &self.stats())
            .finish()
    }
}
