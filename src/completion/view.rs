//! Typed view over the engine's completion record array
//!
//! Built once from (base, layout, count) and checked before any indexed access.

use crate::errors::{BridgeError, Result};
use crate::interop::types::CXCompletionResult;
use crate::interop::RecordLayout;

/// Validated slice of native completion records
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'b> {
    records: &'b [CXCompletionResult],
}

impl<'b> RecordView<'b> {
    /// Validate the engine's record description and wrap `count` records at `base`
    ///
    /// # Safety
    /// When validation passes, `base` must point at `count` initialised records
    /// that stay live for `'b`.
    pub unsafe fn new(
        base: *const CXCompletionResult,
        layout: RecordLayout,
        count: usize,
    ) -> Result<Self> {
        if count == 0 {
            return Ok(Self::empty());
        }

        check_layout(layout)?;

        if base.is_null() {
            return Err(BridgeError::schema(format!(
                "{count} results reported with a null record array"
            )));
        }
        if (base as usize) % layout.align != 0 {
            return Err(BridgeError::schema(format!(
                "record array at {base:p} is not aligned to {} bytes",
                layout.align
            )));
        }
        match count.checked_mul(layout.size) {
            Some(bytes) if bytes <= isize::MAX as usize => {}
            _ => {
                return Err(BridgeError::schema(format!(
                    "{count} records of {} bytes overflow the address space",
                    layout.size
                )))
            }
        }

        Ok(Self {
            records: std::slice::from_raw_parts(base, count),
        })
    }

    pub fn empty() -> Self {
        Self { records: &[] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&'b CXCompletionResult> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'b, CXCompletionResult> {
        self.records.iter()
    }
}

fn check_layout(layout: RecordLayout) -> Result<()> {
    let host = RecordLayout::host();

    let Some(offset) = layout.completion_string else {
        return Err(BridgeError::schema("record has no CompletionString field"));
    };
    if offset != host.completion_string.unwrap_or_default() {
        return Err(BridgeError::schema(format!(
            "CompletionString at offset {offset}, expected {}",
            host.completion_string.unwrap_or_default()
        )));
    }
    if layout.size != host.size {
        return Err(BridgeError::schema(format!(
            "record size {} bytes, expected {}",
            layout.size, host.size
        )));
    }
    if layout.align != host.align {
        return Err(BridgeError::schema(format!(
            "record alignment {}, expected {}",
            layout.align, host.align
        )));
    }
    Ok(())
}
