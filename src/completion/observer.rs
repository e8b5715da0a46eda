//! Completion diagnostics hook
//!
//! Observers see the decode as it happens but return nothing, so they cannot
//! change what gets decoded or when the result block is released.

use super::CompletionCandidate;
use std::path::Path;
use tracing::{debug, trace};

pub trait CompletionObserver {
    fn on_request(&self, _file: &Path, _line: u32, _column: u32) {}

    /// Candidate count read from the result block
    fn on_results(&self, _count: usize) {}

    fn on_candidate(&self, _index: usize, _candidate: &CompletionCandidate) {}

    /// Result block released; `decoded` is false when decoding failed
    fn on_disposed(&self, _decoded: bool) {}
}

/// Emits nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CompletionObserver for NoopObserver {}

/// Emits `tracing` events under the `completion` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CompletionObserver for TracingObserver {
    fn on_request(&self, file: &Path, line: u32, column: u32) {
        debug!(
            target: "completion",
            file = %file.display(),
            line,
            column,
            "code completion requested"
        );
    }

    fn on_results(&self, count: usize) {
        debug!(target: "completion", results = count, "completion result count");
    }

    fn on_candidate(&self, index: usize, candidate: &CompletionCandidate) {
        if tracing::enabled!(target: "completion", tracing::Level::TRACE) {
            let json = serde_json::to_string(candidate).unwrap_or_default();
            trace!(target: "completion", index, candidate = %json, "decoded candidate");
        }
    }

    fn on_disposed(&self, decoded: bool) {
        trace!(target: "completion", decoded, "completion results disposed");
    }
}
