//! Code completion - decoding the engine's result blocks
//!
//! Architecture:
//! - `view.rs` - bounds-checked typed view over the native record array
//! - `decode.rs` - disposal guard and per-candidate decoding
//! - `observer.rs` - diagnostics hook, kept out of the decode control flow
//!
//! Candidates keep the order the engine returned them in.

mod decode;
mod observer;
mod view;

pub(crate) use decode::complete;
pub use decode::CompletionResults;
pub use observer::{CompletionObserver, NoopObserver, TracingObserver};
pub use view::RecordView;

use core::ffi::c_int;
use serde::{Deserialize, Serialize, Serializer};

/// Engine-reported usability of a candidate (`CXAvailabilityKind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "deprecated")]
    Deprecated,
    #[serde(rename = "not available")]
    NotAvailable,
    #[serde(rename = "not accessible")]
    NotAccessible,
}

impl Availability {
    pub const ALL: [Self; 4] = [
        Self::Available,
        Self::Deprecated,
        Self::NotAvailable,
        Self::NotAccessible,
    ];

    pub fn from_raw(value: c_int) -> Option<Self> {
        usize::try_from(value).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Deprecated => "deprecated",
            Self::NotAvailable => "not available",
            Self::NotAccessible => "not accessible",
        }
    }
}

/// Structural role of one completion chunk (`CXCompletionChunkKind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkKind {
    Optional,
    TypedText,
    Text,
    Placeholder,
    Informative,
    CurrentParameter,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftAngle,
    RightAngle,
    Comma,
    ResultType,
    Colon,
    SemiColon,
    Equal,
    HorizontalSpace,
    VerticalSpace,
    Unknown,
}

impl ChunkKind {
    pub const ALL: [Self; 22] = [
        Self::Optional,
        Self::TypedText,
        Self::Text,
        Self::Placeholder,
        Self::Informative,
        Self::CurrentParameter,
        Self::LeftParen,
        Self::RightParen,
        Self::LeftBracket,
        Self::RightBracket,
        Self::LeftBrace,
        Self::RightBrace,
        Self::LeftAngle,
        Self::RightAngle,
        Self::Comma,
        Self::ResultType,
        Self::Colon,
        Self::SemiColon,
        Self::Equal,
        Self::HorizontalSpace,
        Self::VerticalSpace,
        Self::Unknown,
    ];

    /// Map the engine's integer; anything outside the table is `Unknown`
    pub fn from_raw(value: c_int) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::Unknown)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Optional => "Optional",
            Self::TypedText => "TypedText",
            Self::Text => "Text",
            Self::Placeholder => "Placeholder",
            Self::Informative => "Informative",
            Self::CurrentParameter => "CurrentParameter",
            Self::LeftParen => "LeftParen",
            Self::RightParen => "RightParen",
            Self::LeftBracket => "LeftBracket",
            Self::RightBracket => "RightBracket",
            Self::LeftBrace => "LeftBrace",
            Self::RightBrace => "RightBrace",
            Self::LeftAngle => "LeftAngle",
            Self::RightAngle => "RightAngle",
            Self::Comma => "Comma",
            Self::ResultType => "ResultType",
            Self::Colon => "Colon",
            Self::SemiColon => "SemiColon",
            Self::Equal => "Equal",
            Self::HorizontalSpace => "HorizontalSpace",
            Self::VerticalSpace => "VerticalSpace",
            Self::Unknown => "Unknown",
        }
    }
}

/// A decoded enum value: its label, or the engine's integer in raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag<T> {
    Named(T),
    Raw(c_int),
}

impl<T> Tag<T> {
    pub fn named(&self) -> Option<&T> {
        match self {
            Self::Named(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<c_int> {
        match self {
            Self::Raw(value) => Some(*value),
            Self::Named(_) => None,
        }
    }
}

/// One labelled fragment of a candidate's display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub kind: Tag<ChunkKind>,
}

/// Element of the flattened `(text, kind)` chunk sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChunkValue {
    Text(String),
    Kind(Tag<ChunkKind>),
}

/// One suggestion offered at the requested position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCandidate {
    pub availability: Tag<Availability>,
    /// Lower is better; informational only
    pub priority: u32,
    pub comment: Option<String>,
    #[serde(serialize_with = "serialize_flat_chunks")]
    pub chunks: Vec<Chunk>,
}

impl CompletionCandidate {
    /// Chunks as an alternating text, kind sequence
    pub fn flat_chunks(&self) -> Vec<ChunkValue> {
        self.chunks
            .iter()
            .flat_map(|chunk| [ChunkValue::Text(chunk.text.clone()), ChunkValue::Kind(chunk.kind)])
            .collect()
    }

    /// Text of the `TypedText` chunk, the part a user actually types
    pub fn typed_text(&self) -> Option<&str> {
        self.chunks
            .iter()
            .find(|chunk| matches!(chunk.kind, Tag::Named(ChunkKind::TypedText) | Tag::Raw(1)))
            .map(|chunk| chunk.text.as_str())
    }
}

fn serialize_flat_chunks<S: Serializer>(
    chunks: &[Chunk],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(chunks.len() * 2))?;
    for chunk in chunks {
        seq.serialize_element(&chunk.text)?;
        seq.serialize_element(&chunk.kind)?;
    }
    seq.end()
}

#[cfg(test)]
mod tests;
