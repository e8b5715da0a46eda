//! Completion tests - label tables, record view validation, disposal guard

use super::*;
use crate::errors::BridgeError;
use crate::interop::types::{CXCompletionResult, CXTranslationUnit};
use crate::interop::{EngineBinding, RecordLayout, ScriptedCandidate, ScriptedEngine};
use core::ffi::c_void;
use core::mem::size_of;
use core::ptr;

fn request(engine: &ScriptedEngine) -> *mut crate::interop::types::CXCodeCompleteResults {
    unsafe {
        engine.code_complete_at(
            0x1 as CXTranslationUnit,
            c"main.c".as_ptr(),
            1,
            1,
            ptr::null_mut(),
            0,
            engine.default_code_complete_options(),
        )
    }
}

// ===== Label tables =====

#[test]
fn test_availability_table_matches_engine_order() {
    let labels: Vec<_> = (0..4)
        .map(|i| Availability::from_raw(i).unwrap().label())
        .collect();
    assert_eq!(labels, ["available", "deprecated", "not available", "not accessible"]);
    assert_eq!(Availability::from_raw(4), None);
    assert_eq!(Availability::from_raw(-1), None);
}

#[test]
fn test_chunk_kind_table_has_22_entries_in_order() {
    assert_eq!(ChunkKind::ALL.len(), 22);
    assert_eq!(ChunkKind::from_raw(0), ChunkKind::Optional);
    assert_eq!(ChunkKind::from_raw(1), ChunkKind::TypedText);
    assert_eq!(ChunkKind::from_raw(6), ChunkKind::LeftParen);
    assert_eq!(ChunkKind::from_raw(15), ChunkKind::ResultType);
    assert_eq!(ChunkKind::from_raw(17), ChunkKind::SemiColon);
    assert_eq!(ChunkKind::from_raw(20), ChunkKind::VerticalSpace);
    assert_eq!(ChunkKind::from_raw(21), ChunkKind::Unknown);
    for (i, kind) in ChunkKind::ALL.iter().enumerate() {
        assert_eq!(ChunkKind::from_raw(i as i32), *kind);
    }
}

#[test]
fn test_chunk_kind_out_of_range_is_unknown() {
    assert_eq!(ChunkKind::from_raw(22), ChunkKind::Unknown);
    assert_eq!(ChunkKind::from_raw(-3), ChunkKind::Unknown);
}

#[test]
fn test_labels_match_serialized_form() {
    for kind in ChunkKind::ALL {
        assert_eq!(serde_json::to_value(kind).unwrap(), kind.label());
    }
    for availability in Availability::ALL {
        assert_eq!(serde_json::to_value(availability).unwrap(), availability.label());
    }
}

// ===== Candidate representation =====

#[test]
fn test_candidate_serializes_like_flat_json() {
    let candidate = CompletionCandidate {
        availability: Tag::Named(Availability::Available),
        priority: 50,
        comment: None,
        chunks: vec![
            Chunk {
                text: "int".into(),
                kind: Tag::Named(ChunkKind::ResultType),
            },
            Chunk {
                text: "size".into(),
                kind: Tag::Named(ChunkKind::TypedText),
            },
        ],
    };

    let json = serde_json::to_value(&candidate).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "availability": "available",
            "priority": 50,
            "comment": null,
            "chunks": ["int", "ResultType", "size", "TypedText"],
        })
    );
    assert_eq!(candidate.typed_text(), Some("size"));
}

#[test]
fn test_raw_candidate_serializes_integers() {
    let candidate = CompletionCandidate {
        availability: Tag::Raw(1),
        priority: 7,
        comment: Some("old".into()),
        chunks: vec![Chunk {
            text: "f".into(),
            kind: Tag::Raw(1),
        }],
    };
    let json = serde_json::to_value(&candidate).unwrap();
    assert_eq!(json["availability"], 1);
    assert_eq!(json["chunks"], serde_json::json!(["f", 1]));
    assert_eq!(candidate.flat_chunks().len(), 2);
    assert_eq!(candidate.typed_text(), Some("f"));
}

// ===== Record view =====

#[test]
fn test_empty_view_accepts_null_base() {
    let view = unsafe { RecordView::new(ptr::null(), RecordLayout::host(), 0) }.unwrap();
    assert!(view.is_empty());
}

#[test]
fn test_view_rejects_null_base_with_records() {
    let err = unsafe { RecordView::new(ptr::null(), RecordLayout::host(), 3) }.unwrap_err();
    assert!(err.is_schema_mismatch());
}

#[test]
fn test_view_rejects_missing_completion_string_field() {
    let records = [CXCompletionResult {
        cursor_kind: 0,
        completion_string: 0x10 as *mut c_void,
    }];
    let layout = RecordLayout {
        completion_string: None,
        ..RecordLayout::host()
    };
    let err = unsafe { RecordView::new(records.as_ptr(), layout, 1) }.unwrap_err();
    assert!(err.to_string().contains("no CompletionString field"));
}

#[test]
fn test_view_rejects_wrong_record_size() {
    let records = [CXCompletionResult {
        cursor_kind: 0,
        completion_string: 0x10 as *mut c_void,
    }];
    let layout = RecordLayout {
        size: size_of::<CXCompletionResult>() + 8,
        ..RecordLayout::host()
    };
    let err = unsafe { RecordView::new(records.as_ptr(), layout, 1) }.unwrap_err();
    assert!(err.is_schema_mismatch());
}

#[test]
fn test_view_rejects_misaligned_base() {
    let records = [
        CXCompletionResult {
            cursor_kind: 0,
            completion_string: 0x10 as *mut c_void,
        };
        2
    ];
    let misaligned = unsafe { (records.as_ptr() as *const u8).add(1) } as *const CXCompletionResult;
    let err = unsafe { RecordView::new(misaligned, RecordLayout::host(), 1) }.unwrap_err();
    assert!(err.to_string().contains("not aligned"));
}

#[test]
fn test_view_indexes_within_bounds_only() {
    let records = [
        CXCompletionResult {
            cursor_kind: 1,
            completion_string: 0x10 as *mut c_void,
        },
        CXCompletionResult {
            cursor_kind: 2,
            completion_string: 0x20 as *mut c_void,
        },
    ];
    let view = unsafe { RecordView::new(records.as_ptr(), RecordLayout::host(), 2) }.unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.get(1).unwrap().cursor_kind, 2);
    assert!(view.get(2).is_none());
}

// ===== Disposal guard =====

#[test]
fn test_null_block_is_invalid_handle() {
    let engine = ScriptedEngine::new();
    let err = unsafe { CompletionResults::acquire(&engine, ptr::null_mut()) }
        .err()
        .unwrap();
    assert!(matches!(err, BridgeError::InvalidHandle { what: "completion results" }));
}

#[test]
fn test_guard_disposes_on_drop() {
    let engine = ScriptedEngine::new().with_candidates(vec![ScriptedCandidate::new(0, 1)]);
    {
        let results = unsafe { CompletionResults::acquire(&engine, request(&engine)) }.unwrap();
        assert_eq!(results.len(), 1);
    }
    let stats = engine.stats();
    assert_eq!(stats.results_disposed, 1);
    assert_eq!(stats.live_result_blocks, 0);
}

#[test]
fn test_second_dispose_reports_contract_violation() {
    let engine = ScriptedEngine::new();
    let mut results = unsafe { CompletionResults::acquire(&engine, request(&engine)) }.unwrap();

    results.dispose().unwrap();
    assert!(matches!(results.dispose(), Err(BridgeError::ResultDisposal)));
    assert!(matches!(results.records(), Err(BridgeError::ResultDisposal)));
    assert!(results.is_empty());
    drop(results);

    let stats = engine.stats();
    assert_eq!(stats.results_disposed, 1);
    assert_eq!(stats.invalid_disposals, 0);
}
