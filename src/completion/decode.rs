//! Completion decoding
//!
//! The result block is owned by [`CompletionResults`] from the moment the
//! engine returns it. Release goes through a single routine, reached either by
//! an explicit `dispose` or by drop, so every exit path frees it exactly once.

use super::observer::CompletionObserver;
use super::view::RecordView;
use super::{Availability, Chunk, ChunkKind, CompletionCandidate, Tag};
use crate::allocator::CallArena;
use crate::errors::{BridgeError, Result};
use crate::interop::types::{CXCodeCompleteResults, CXCompletionResult, CXTranslationUnit};
use crate::interop::{take_string, EngineBinding};
use core::ffi::c_uint;
use core::ptr::NonNull;
use std::path::Path;

/// Chunk counts are a 16-bit field of the engine's completion string
const MAX_CHUNKS: c_uint = u16::MAX as c_uint;

/// Owned engine result block (`CXCodeCompleteResults *`)
pub struct CompletionResults<'e> {
    engine: &'e dyn EngineBinding,
    block: Option<NonNull<CXCodeCompleteResults>>,
}

impl<'e> CompletionResults<'e> {
    /// Take ownership of a block returned by `clang_codeCompleteAt`
    ///
    /// # Safety
    /// `block` must be null or a live, undisposed block produced by `engine`.
    pub unsafe fn acquire(
        engine: &'e dyn EngineBinding,
        block: *mut CXCodeCompleteResults,
    ) -> Result<Self> {
        let block = NonNull::new(block).ok_or(BridgeError::InvalidHandle {
            what: "completion results",
        })?;
        Ok(Self {
            engine,
            block: Some(block),
        })
    }

    fn header(&self) -> Option<&CXCodeCompleteResults> {
        // SAFETY: the block stays live while it is held here.
        self.block.map(|b| unsafe { &*b.as_ptr() })
    }

    /// Number of records, zero once disposed
    pub fn len(&self) -> usize {
        self.header().map_or(0, |h| h.num_results as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validated view over the records
    pub fn records(&self) -> Result<RecordView<'_>> {
        let Some(header) = self.header() else {
            return Err(BridgeError::ResultDisposal);
        };
        let base = header.results as *const CXCompletionResult;
        // SAFETY: the engine owns `num_results` records at `results` until disposal,
        // which needs `&mut self` and so cannot overlap this borrow.
        unsafe { RecordView::new(base, self.engine.completion_record_layout(), self.len()) }
    }

    /// Release the block now
    ///
    /// A second call reports `ResultDisposal` instead of freeing again.
    pub fn dispose(&mut self) -> Result<()> {
        if self.release() {
            Ok(())
        } else {
            Err(BridgeError::ResultDisposal)
        }
    }

    fn release(&mut self) -> bool {
        match self.block.take() {
            Some(block) => {
                // SAFETY: taken out of `self.block`, so this runs once per block.
                unsafe { self.engine.dispose_code_complete_results(block.as_ptr()) };
                true
            }
            None => false,
        }
    }
}

impl Drop for CompletionResults<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Request completions at `line`/`column` and decode every candidate
pub(crate) fn complete(
    engine: &dyn EngineBinding,
    tu: CXTranslationUnit,
    file: &Path,
    line: u32,
    column: u32,
    raw: bool,
    observer: &dyn CompletionObserver,
) -> Result<Vec<CompletionCandidate>> {
    observer.on_request(file, line, column);

    let arena = CallArena::new();
    let filename = arena.path(file)?;
    let options = engine.default_code_complete_options();

    // SAFETY: `tu` is live for the caller's borrow and `filename` lives in `arena`.
    let block = unsafe {
        engine.code_complete_at(
            tu,
            filename.as_ptr(),
            line,
            column,
            core::ptr::null_mut(),
            0,
            options,
        )
    };
    let mut results = unsafe { CompletionResults::acquire(engine, block)? };

    let decoded = decode_all(engine, &results, raw, observer);
    results.dispose()?;
    observer.on_disposed(decoded.is_ok());

    decoded
}

fn decode_all(
    engine: &dyn EngineBinding,
    results: &CompletionResults<'_>,
    raw: bool,
    observer: &dyn CompletionObserver,
) -> Result<Vec<CompletionCandidate>> {
    let count = results.len();
    observer.on_results(count);
    if count == 0 {
        return Ok(Vec::new());
    }

    let view = results.records()?;
    let mut candidates = Vec::with_capacity(view.len());
    for (index, record) in view.iter().enumerate() {
        // SAFETY: records belong to a block that is still held by `results`.
        let candidate = unsafe { decode_candidate(engine, index, record, raw)? };
        observer.on_candidate(index, &candidate);
        candidates.push(candidate);
    }
    Ok(candidates)
}

/// # Safety
/// `record` must belong to an undisposed result block produced by `engine`.
unsafe fn decode_candidate(
    engine: &dyn EngineBinding,
    index: usize,
    record: &CXCompletionResult,
    raw: bool,
) -> Result<CompletionCandidate> {
    let s = record.completion_string;
    if s.is_null() {
        return Err(BridgeError::schema(format!(
            "record {index} has a null CompletionString"
        )));
    }

    let availability_raw = engine.completion_availability(s);
    let availability = if raw {
        Tag::Raw(availability_raw)
    } else {
        let label = Availability::from_raw(availability_raw).ok_or_else(|| {
            BridgeError::schema(format!(
                "record {index} reports availability {availability_raw}, expected 0..=3"
            ))
        })?;
        Tag::Named(label)
    };

    let priority = engine.completion_priority(s);
    let comment = take_string(engine, engine.completion_brief_comment(s)).filter(|c| !c.is_empty());

    let num_chunks = engine.num_completion_chunks(s);
    if num_chunks > MAX_CHUNKS {
        return Err(BridgeError::schema(format!(
            "record {index} reports {num_chunks} chunks, limit is {MAX_CHUNKS}"
        )));
    }
    let mut chunks = Vec::new();
    chunks
        .try_reserve_exact(num_chunks as usize)
        .map_err(|e| BridgeError::allocation(format!("chunks of record {index}"), e))?;
    for chunk in 0..num_chunks {
        let text = take_string(engine, engine.completion_chunk_text(s, chunk)).unwrap_or_default();
        let kind_raw = engine.completion_chunk_kind(s, chunk);
        let kind = if raw {
            Tag::Raw(kind_raw)
        } else {
            Tag::Named(ChunkKind::from_raw(kind_raw))
        };
        chunks.push(Chunk { text, kind });
    }

    Ok(CompletionCandidate {
        availability,
        priority,
        comment,
        chunks,
    })
}
